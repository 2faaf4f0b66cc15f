//! Relayer signing.
//!
//! The relayer only ever adds its own fee payer signature to a transaction that the
//! sender already signed.
use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

use crate::models::SignerError;

#[async_trait]
#[cfg_attr(test, automock)]
pub trait RelayerSignTrait: Send + Sync {
    /// Public key of the relayer; also the required fee payer.
    fn pubkey(&self) -> Pubkey;

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

/// Signer backed by a keypair held in process memory.
#[derive(Debug)]
pub struct LocalSigner {
    keypair: Keypair,
}

impl LocalSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Loads a Solana CLI style JSON keypair file.
    pub fn from_keypair_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let path = path.as_ref();
        let keypair = read_keypair_file(path).map_err(|e| {
            SignerError::KeyError(format!(
                "Failed to read keypair file {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl RelayerSignTrait for LocalSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        self.keypair
            .try_sign_message(message)
            .map_err(|e| SignerError::SigningError(e.to_string()))
    }
}

/// Signs `transaction` in the signer's own slot and returns it with the new signature.
///
/// Fails when the signer is not one of the transaction's required signers.
pub async fn sign_sdk_transaction<T: RelayerSignTrait + ?Sized>(
    signer: &T,
    mut transaction: Transaction,
) -> Result<(Transaction, Signature), SignerError> {
    let signer_pubkey = signer.pubkey();

    let signer_index = transaction
        .message
        .account_keys
        .iter()
        .position(|key| *key == signer_pubkey)
        .ok_or_else(|| {
            SignerError::SigningError(
                "Signer public key not found in transaction signers".to_string(),
            )
        })?;

    let num_required = transaction.message.header.num_required_signatures as usize;
    if signer_index >= num_required {
        return Err(SignerError::SigningError(format!(
            "Signer is not marked as a required signer in the transaction (position {signer_index} >= {num_required})"
        )));
    }

    let signature = signer.sign(&transaction.message_data()).await?;

    // Keep existing signatures, only fill our own slot.
    transaction
        .signatures
        .resize(num_required, Signature::default());
    transaction.signatures[signer_index] = signature;

    Ok((transaction, signature))
}
