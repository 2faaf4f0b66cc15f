//! Background jobs.

mod reconciliation_worker;
pub use reconciliation_worker::*;
