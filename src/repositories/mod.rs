//! # Repository Module
//!
//! Persistence layer for transfer records and the identity registry. Both are
//! expressed as traits so a durable backend can replace the in-memory stores.

pub mod identity;
pub use identity::*;

pub mod transfer;
pub use transfer::*;
