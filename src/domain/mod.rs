//! # Domain Module
//!
//! Core domain logic for the relay:
//!
//! * Instruction validation and the admission gate
//! * Settlement reconciliation
//! * Status queries

pub mod transfer;
pub use transfer::*;
