//! External collaborators: the ledger client, the relayer signer and settlement
//! notification delivery.

mod notification;
pub use notification::*;

mod provider;
pub use provider::*;

mod signer;
pub use signer::*;
