use std::time::Duration;

/// A sponsored transfer is exactly: create recipient holding account, then transfer.
pub const EXPECTED_INSTRUCTION_COUNT: usize = 2;

/// Relayer (fee payer) and sender.
pub const EXPECTED_SIGNER_COUNT: usize = 2;

/// Instruction tag of `CreateIdempotent` in the associated token account program.
pub const ATA_CREATE_IDEMPOTENT_TAG: u8 = 1;

pub const DEFAULT_RECONCILE_INTERVAL_SECONDS: u64 = 5;

pub const DEFAULT_RPC_CALL_TIMEOUT_SECONDS: u64 = 10;

pub const DEFAULT_RECONCILE_INTERVAL: Duration =
    Duration::from_secs(DEFAULT_RECONCILE_INTERVAL_SECONDS);

pub const DEFAULT_RPC_CALL_TIMEOUT: Duration =
    Duration::from_secs(DEFAULT_RPC_CALL_TIMEOUT_SECONDS);
