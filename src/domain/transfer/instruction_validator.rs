//! Structural validation of a sponsored stablecoin transfer.
//!
//! A sponsored transfer carries exactly two instructions:
//! * an idempotent creation of the recipient's associated token account
//! * a `TransferChecked` of the sponsored mint from the sender's associated token account
//!   into that same recipient account
//!
//! Validation is pure: it only looks at the message and the configured asset policy.
use solana_sdk::{instruction::CompiledInstruction, message::Message, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token::instruction::TokenInstruction;
use thiserror::Error;

use crate::constants::{ATA_CREATE_IDEMPOTENT_TAG, EXPECTED_INSTRUCTION_COUNT};

// Account positions inside the associated token account creation instruction.
const ATA_WALLET_INDEX: usize = 2;
const ATA_ACCOUNT_INDEX: usize = 1;
const ATA_MINT_INDEX: usize = 3;
const ATA_TOKEN_PROGRAM_INDEX: usize = 5;
const ATA_ACCOUNT_COUNT: usize = 6;

// Account positions inside `TransferChecked`.
const TRANSFER_SOURCE_INDEX: usize = 0;
const TRANSFER_MINT_INDEX: usize = 1;
const TRANSFER_DESTINATION_INDEX: usize = 2;
const TRANSFER_AUTHORITY_INDEX: usize = 3;

/// The asset the relayer is willing to sponsor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAssetPolicy {
    pub mint: Pubkey,
    pub token_program: Pubkey,
    /// When set, the decimals embedded in `TransferChecked` must match.
    pub decimals: Option<u8>,
}

impl TransferAssetPolicy {
    pub fn new(mint: Pubkey, token_program: Pubkey, decimals: Option<u8>) -> Self {
        Self {
            mint,
            token_program,
            decimals,
        }
    }

    /// Canonical holding account of `wallet` for the sponsored mint.
    pub fn holding_account(&self, wallet: &Pubkey) -> Pubkey {
        get_associated_token_address_with_program_id(wallet, &self.mint, &self.token_program)
    }
}

/// What a structurally valid sponsored transfer moves, and between whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub sender: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub decimals: u8,
    pub sender_token_account: Pubkey,
    pub recipient_token_account: Pubkey,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstructionValidationError {
    #[error("Expected exactly two instructions, found {0}")]
    InstructionCount(usize),

    #[error("Instruction references account index {0} outside the message")]
    AccountIndexOutOfRange(usize),

    #[error("Instruction has no account at position {0}")]
    MissingInstructionAccount(usize),

    #[error("First instruction must target the associated token account program, found {0}")]
    AccountCreationExpected(String),

    #[error("Account creation is not an idempotent associated token account creation: {0}")]
    InvalidAccountCreation(String),

    #[error("Account creation targets {found}, expected {expected}")]
    AccountCreationTargetMismatch { expected: String, found: String },

    #[error("Account creation is for mint {found}, expected {expected}")]
    AccountCreationMintMismatch { expected: String, found: String },

    #[error("Second instruction must be a checked token transfer: {0}")]
    CheckedTransferExpected(String),

    #[error("Transfer declares mint {found}, expected {expected}")]
    AssetMismatch { expected: String, found: String },

    #[error("Transfer source {found} is not the sender holding account {expected}")]
    SourceAccountMismatch { expected: String, found: String },

    #[error("Transfer destination {found} is not the recipient holding account {expected}")]
    DestinationAccountMismatch { expected: String, found: String },

    #[error("Transfer declares {found} decimals, expected {expected}")]
    DecimalsMismatch { expected: u8, found: u8 },
}

impl InstructionValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            InstructionValidationError::InstructionCount(_) => "INSTRUCTION_COUNT",
            InstructionValidationError::AccountIndexOutOfRange(_) => "ACCOUNT_INDEX_OUT_OF_RANGE",
            InstructionValidationError::MissingInstructionAccount(_) => {
                "MISSING_INSTRUCTION_ACCOUNT"
            }
            InstructionValidationError::AccountCreationExpected(_) => "ACCOUNT_CREATION_EXPECTED",
            InstructionValidationError::InvalidAccountCreation(_) => "INVALID_ACCOUNT_CREATION",
            InstructionValidationError::AccountCreationTargetMismatch { .. } => {
                "ACCOUNT_CREATION_TARGET_MISMATCH"
            }
            InstructionValidationError::AccountCreationMintMismatch { .. } => {
                "ACCOUNT_CREATION_MINT_MISMATCH"
            }
            InstructionValidationError::CheckedTransferExpected(_) => "CHECKED_TRANSFER_EXPECTED",
            InstructionValidationError::AssetMismatch { .. } => "ASSET_MISMATCH",
            InstructionValidationError::SourceAccountMismatch { .. } => "SOURCE_ACCOUNT_MISMATCH",
            InstructionValidationError::DestinationAccountMismatch { .. } => {
                "DESTINATION_ACCOUNT_MISMATCH"
            }
            InstructionValidationError::DecimalsMismatch { .. } => "DECIMALS_MISMATCH",
        }
    }
}

pub struct TransferInstructionValidator;

impl TransferInstructionValidator {
    /// Exactly two instructions, no more, no fewer.
    pub fn validate_instruction_count(message: &Message) -> Result<(), InstructionValidationError> {
        let count = message.instructions.len();
        if count != EXPECTED_INSTRUCTION_COUNT {
            return Err(InstructionValidationError::InstructionCount(count));
        }
        Ok(())
    }

    /// Runs every structural rule in order and stops at the first violation.
    pub fn validate(
        message: &Message,
        policy: &TransferAssetPolicy,
    ) -> Result<ValidatedTransfer, InstructionValidationError> {
        Self::validate_instruction_count(message)?;

        let create_ix = &message.instructions[0];
        let transfer_ix = &message.instructions[1];

        let (recipient, recipient_token_account) =
            Self::validate_account_creation(message, create_ix, policy)?;
        Self::validate_checked_transfer(
            message,
            transfer_ix,
            policy,
            recipient,
            recipient_token_account,
        )
    }

    fn validate_account_creation(
        message: &Message,
        ix: &CompiledInstruction,
        policy: &TransferAssetPolicy,
    ) -> Result<(Pubkey, Pubkey), InstructionValidationError> {
        let program_id = program_id(message, ix)?;
        if program_id != spl_associated_token_account::id() {
            return Err(InstructionValidationError::AccountCreationExpected(
                program_id.to_string(),
            ));
        }

        if ix.data != [ATA_CREATE_IDEMPOTENT_TAG] {
            return Err(InstructionValidationError::InvalidAccountCreation(format!(
                "unexpected instruction data {:?}",
                ix.data
            )));
        }
        if ix.accounts.len() != ATA_ACCOUNT_COUNT {
            return Err(InstructionValidationError::InvalidAccountCreation(format!(
                "expected {} accounts, found {}",
                ATA_ACCOUNT_COUNT,
                ix.accounts.len()
            )));
        }

        let token_program = instruction_account(message, ix, ATA_TOKEN_PROGRAM_INDEX)?;
        if token_program != policy.token_program {
            return Err(InstructionValidationError::InvalidAccountCreation(format!(
                "token program {} is not {}",
                token_program, policy.token_program
            )));
        }

        let mint = instruction_account(message, ix, ATA_MINT_INDEX)?;
        if mint != policy.mint {
            return Err(InstructionValidationError::AccountCreationMintMismatch {
                expected: policy.mint.to_string(),
                found: mint.to_string(),
            });
        }

        let recipient = instruction_account(message, ix, ATA_WALLET_INDEX)?;
        let target = instruction_account(message, ix, ATA_ACCOUNT_INDEX)?;
        let expected_target = policy.holding_account(&recipient);
        if target != expected_target {
            return Err(InstructionValidationError::AccountCreationTargetMismatch {
                expected: expected_target.to_string(),
                found: target.to_string(),
            });
        }

        Ok((recipient, target))
    }

    fn validate_checked_transfer(
        message: &Message,
        ix: &CompiledInstruction,
        policy: &TransferAssetPolicy,
        recipient: Pubkey,
        recipient_token_account: Pubkey,
    ) -> Result<ValidatedTransfer, InstructionValidationError> {
        let program_id = program_id(message, ix)?;
        if program_id != policy.token_program {
            return Err(InstructionValidationError::CheckedTransferExpected(format!(
                "program {program_id} is not the token program"
            )));
        }

        let (amount, decimals) = match TokenInstruction::unpack(&ix.data) {
            Ok(TokenInstruction::TransferChecked { amount, decimals }) => (amount, decimals),
            Ok(_) => {
                return Err(InstructionValidationError::CheckedTransferExpected(
                    "instruction is not TransferChecked".to_string(),
                ))
            }
            Err(e) => {
                return Err(InstructionValidationError::CheckedTransferExpected(format!(
                    "undecodable token instruction: {e}"
                )))
            }
        };

        let mint = instruction_account(message, ix, TRANSFER_MINT_INDEX)?;
        if mint != policy.mint {
            return Err(InstructionValidationError::AssetMismatch {
                expected: policy.mint.to_string(),
                found: mint.to_string(),
            });
        }

        let sender = instruction_account(message, ix, TRANSFER_AUTHORITY_INDEX)?;
        let source = instruction_account(message, ix, TRANSFER_SOURCE_INDEX)?;
        let expected_source = policy.holding_account(&sender);
        if source != expected_source {
            return Err(InstructionValidationError::SourceAccountMismatch {
                expected: expected_source.to_string(),
                found: source.to_string(),
            });
        }

        let destination = instruction_account(message, ix, TRANSFER_DESTINATION_INDEX)?;
        if destination != recipient_token_account {
            return Err(InstructionValidationError::DestinationAccountMismatch {
                expected: recipient_token_account.to_string(),
                found: destination.to_string(),
            });
        }

        if let Some(expected) = policy.decimals {
            if decimals != expected {
                return Err(InstructionValidationError::DecimalsMismatch {
                    expected,
                    found: decimals,
                });
            }
        }

        Ok(ValidatedTransfer {
            sender,
            recipient,
            amount,
            decimals,
            sender_token_account: source,
            recipient_token_account,
        })
    }
}

fn program_id(message: &Message, ix: &CompiledInstruction) -> Result<Pubkey, InstructionValidationError> {
    let index = ix.program_id_index as usize;
    message
        .account_keys
        .get(index)
        .copied()
        .ok_or(InstructionValidationError::AccountIndexOutOfRange(index))
}

fn instruction_account(
    message: &Message,
    ix: &CompiledInstruction,
    position: usize,
) -> Result<Pubkey, InstructionValidationError> {
    let index = *ix
        .accounts
        .get(position)
        .ok_or(InstructionValidationError::MissingInstructionAccount(position))?
        as usize;
    message
        .account_keys
        .get(index)
        .copied()
        .ok_or(InstructionValidationError::AccountIndexOutOfRange(index))
}
