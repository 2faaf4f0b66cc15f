//! HTTP surface of the relay.

pub mod controllers;
pub mod routes;
