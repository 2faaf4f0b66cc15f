mod admission;
pub use admission::*;

mod api;
pub use api::*;

mod repository_error;
pub use repository_error::*;

mod signer;
pub use signer::*;
