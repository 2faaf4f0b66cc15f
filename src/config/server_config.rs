use std::{env, str::FromStr, time::Duration};

use solana_sdk::pubkey::Pubkey;

use super::ConfigError;
use crate::{
    constants::{
        DEFAULT_HOST, DEFAULT_IDENTITY_CONFIG_PATH, DEFAULT_PORT,
        DEFAULT_RECONCILE_INTERVAL_SECONDS, DEFAULT_RPC_CALL_TIMEOUT_SECONDS,
    },
    domain::TransferAssetPolicy,
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub solana_rpc_url: String,
    pub relayer_keypair_path: String,
    pub stablecoin_mint: Pubkey,
    pub stablecoin_decimals: Option<u8>,
    pub token_program_id: Pubkey,
    pub identity_config_path: String,
    pub reconcile_interval: Duration,
    pub rpc_call_timeout: Duration,
    pub settlement_webhook_url: Option<String>,
}

fn required(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name.to_string())),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(name).map_or(Ok(default), |value| parse(name, &value))
}

fn positive_seconds(name: &str, default: u64) -> Result<Duration, ConfigError> {
    let seconds: u64 = parse_or(name, default)?;
    if seconds == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(seconds))
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", DEFAULT_PORT)?,
            solana_rpc_url: required("SOLANA_RPC_URL")?,
            relayer_keypair_path: required("RELAYER_KEYPAIR_PATH")?,
            stablecoin_mint: parse("STABLECOIN_MINT", &required("STABLECOIN_MINT")?)?,
            stablecoin_decimals: optional("STABLECOIN_DECIMALS")
                .map(|value| parse("STABLECOIN_DECIMALS", &value))
                .transpose()?,
            token_program_id: parse_or("TOKEN_PROGRAM_ID", spl_token::id())?,
            identity_config_path: optional("IDENTITY_CONFIG_PATH")
                .unwrap_or_else(|| DEFAULT_IDENTITY_CONFIG_PATH.to_string()),
            reconcile_interval: positive_seconds(
                "RECONCILE_INTERVAL_SECONDS",
                DEFAULT_RECONCILE_INTERVAL_SECONDS,
            )?,
            rpc_call_timeout: positive_seconds(
                "RPC_CALL_TIMEOUT_SECONDS",
                DEFAULT_RPC_CALL_TIMEOUT_SECONDS,
            )?,
            settlement_webhook_url: optional("SETTLEMENT_WEBHOOK_URL"),
        })
    }

    /// The single stablecoin this relay sponsors.
    pub fn asset_policy(&self) -> TransferAssetPolicy {
        TransferAssetPolicy::new(
            self.stablecoin_mint,
            self.token_program_id,
            self.stablecoin_decimals,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 11] = [
        "HOST",
        "PORT",
        "SOLANA_RPC_URL",
        "RELAYER_KEYPAIR_PATH",
        "STABLECOIN_MINT",
        "STABLECOIN_DECIMALS",
        "TOKEN_PROGRAM_ID",
        "IDENTITY_CONFIG_PATH",
        "RECONCILE_INTERVAL_SECONDS",
        "RPC_CALL_TIMEOUT_SECONDS",
        "SETTLEMENT_WEBHOOK_URL",
    ];

    fn reset_env() {
        for var in ALL_VARS {
            env::remove_var(var);
        }
    }

    fn set_required(mint: &Pubkey) {
        env::set_var("SOLANA_RPC_URL", "http://localhost:8899");
        env::set_var("RELAYER_KEYPAIR_PATH", "/tmp/relayer.json");
        env::set_var("STABLECOIN_MINT", mint.to_string());
    }

    #[test]
    #[serial]
    fn test_defaults() {
        reset_env();
        let mint = Pubkey::new_unique();
        set_required(&mint);

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.stablecoin_mint, mint);
        assert_eq!(config.stablecoin_decimals, None);
        assert_eq!(config.token_program_id, spl_token::id());
        assert_eq!(config.identity_config_path, DEFAULT_IDENTITY_CONFIG_PATH);
        assert_eq!(
            config.reconcile_interval,
            Duration::from_secs(DEFAULT_RECONCILE_INTERVAL_SECONDS)
        );
        assert_eq!(
            config.rpc_call_timeout,
            Duration::from_secs(DEFAULT_RPC_CALL_TIMEOUT_SECONDS)
        );
        assert!(config.settlement_webhook_url.is_none());
        reset_env();
    }

    #[test]
    #[serial]
    fn test_overrides() {
        reset_env();
        let mint = Pubkey::new_unique();
        set_required(&mint);
        env::set_var("PORT", "9090");
        env::set_var("STABLECOIN_DECIMALS", "6");
        env::set_var("RECONCILE_INTERVAL_SECONDS", "2");
        env::set_var("SETTLEMENT_WEBHOOK_URL", "http://hooks.local/settled");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.stablecoin_decimals, Some(6));
        assert_eq!(config.reconcile_interval, Duration::from_secs(2));
        assert_eq!(
            config.settlement_webhook_url.as_deref(),
            Some("http://hooks.local/settled")
        );

        let policy = config.asset_policy();
        assert_eq!(policy.mint, mint);
        assert_eq!(policy.decimals, Some(6));
        reset_env();
    }

    #[test]
    #[serial]
    fn test_missing_required_variable() {
        reset_env();
        env::set_var("SOLANA_RPC_URL", "http://localhost:8899");
        env::set_var("STABLECOIN_MINT", Pubkey::new_unique().to_string());

        match ServerConfig::from_env() {
            Err(ConfigError::MissingEnv(name)) => assert_eq!(name, "RELAYER_KEYPAIR_PATH"),
            other => panic!("unexpected result: {other:?}"),
        }
        reset_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values() {
        reset_env();
        set_required(&Pubkey::new_unique());
        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        env::remove_var("PORT");
        env::set_var("STABLECOIN_MINT", "bad-mint");
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        set_required(&Pubkey::new_unique());
        env::set_var("RPC_CALL_TIMEOUT_SECONDS", "0");
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));
        reset_env();
    }
}
