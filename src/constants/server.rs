pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_IDENTITY_CONFIG_PATH: &str = "./config/identities.json";
