//! Service configuration: environment variables plus the identity seed file.

mod config_file;
pub use config_file::*;

mod server_config;
pub use server_config::*;
