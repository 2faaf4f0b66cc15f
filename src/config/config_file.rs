//! Identity registry seed file.
//!
//! ```json
//! { "identities": [ { "address": "<base58>", "compliant": true } ] }
//! ```
use std::{collections::HashSet, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::models::IdentityModel;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Duplicate address: {0}")]
    DuplicateAddress(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityConfigFile {
    pub identities: Vec<IdentityModel>,
}

impl IdentityConfigFile {
    fn validate_address_uniqueness(identities: &[IdentityModel]) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for identity in identities {
            if !seen.insert(&identity.address) {
                return Err(ConfigError::DuplicateAddress(identity.address.clone()));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identities.is_empty() {
            return Err(ConfigError::MissingField("identities".into()));
        }
        for identity in &self.identities {
            Pubkey::from_str(&identity.address)
                .map_err(|e| ConfigError::InvalidAddress(format!("{}: {e}", identity.address)))?;
        }
        Self::validate_address_uniqueness(&self.identities)
    }
}

pub fn load_identity_config(path: impl AsRef<Path>) -> Result<IdentityConfigFile, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    let config: IdentityConfigFile = serde_json::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}
