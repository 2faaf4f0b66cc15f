//! Fee-sponsored stablecoin relay.
//!
//! Clients submit a partially signed two-instruction stablecoin transfer
//! (create the recipient's holding account idempotently, then a checked transfer).
//! The relay validates it against policy, co-signs it as fee payer, records it and
//! drives it to a terminal state against the ledger:
//!
//! * `domain` - admission gate, instruction validator, reconciliation and status query
//! * `repositories` - transfer record store and identity registry
//! * `services` - ledger client, relayer signer and settlement notification
//! * `jobs` - the periodic reconciliation worker
//! * `api` - actix-web routes and controllers

pub mod api;
pub mod config;
pub mod constants;
pub mod domain;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
