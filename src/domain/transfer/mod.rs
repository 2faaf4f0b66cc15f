//! Sponsored transfer admission and settlement reconciliation.

mod admission;
pub use admission::*;

mod instruction_validator;
pub use instruction_validator::*;

mod query;
pub use query::*;

mod status;
pub use status::*;

pub mod utils;
