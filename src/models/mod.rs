//! Domain models shared across the relay.

mod api_response;
pub use api_response::*;

mod app_state;
pub use app_state::*;

pub mod error;
pub use error::*;

mod identity;
pub use identity::*;

mod notification;
pub use notification::*;

mod transfer;
pub use transfer::*;
