//! Ledger client.
//!
//! The relay consumes the ledger only through [`LedgerProviderTrait`]; the Solana
//! JSON-RPC binding lives in [`solana`].
pub mod solana;
pub use solana::*;
