use serde::{Deserialize, Serialize};

/// An identity pre-authorised to use the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityModel {
    /// Base58 wallet address.
    pub address: String,
    /// Result of the compliance predicate for this identity.
    pub compliant: bool,
}

impl IdentityModel {
    pub fn new(address: impl Into<String>, compliant: bool) -> Self {
        Self {
            address: address.into(),
            compliant,
        }
    }
}
