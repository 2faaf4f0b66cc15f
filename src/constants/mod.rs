mod logging;
pub use logging::*;

mod relay;
pub use relay::*;

mod server;
pub use server::*;
