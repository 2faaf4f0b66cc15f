//! # API Routes Module
//!
//! Configures HTTP routes for the relay API.
//!
//! ## Routes
//!
//! * `/health` - Liveness check
//! * `/transfers` - Transfer submission and status

pub mod health;
pub mod metrics;
pub mod transfer;

use actix_web::web;

/// Routes mounted under `/api/v1`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::init).configure(transfer::init);
}
