mod base64;
pub use base64::*;
