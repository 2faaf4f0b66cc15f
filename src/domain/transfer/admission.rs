//! Relay admission gate.
//!
//! Decides whether the relayer may co-sign an untrusted, sender-signed transfer.
//! Checks run fail fast in this order:
//!
//! 1. decode and sanitize
//! 2. structure: instruction count, fee payer, recent blockhash, signer set
//! 3. instruction validation
//! 4. writable accounts
//! 5. sender and recipient registration and compliance
//! 6. signatures: sender present and valid, relayer slot still empty
//!
//! An accepted transfer is co-signed and stored exactly once under the sender
//! signature.
use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction as SolanaTransaction,
};
use tracing::{debug, info, warn};

use super::{
    instruction_validator::{TransferAssetPolicy, TransferInstructionValidator, ValidatedTransfer},
    utils::{decode_transfer_transaction, transfer_id, SENDER_SIGNER_INDEX},
};
use crate::{
    constants::EXPECTED_SIGNER_COUNT,
    metrics::ADMISSIONS_TOTAL,
    models::{AdmissionError, EncodedSerializedTransaction, NewTransferRecord, TransferRecord},
    repositories::{CreateOutcome, IdentityRegistry, TransferRepository},
    services::{sign_sdk_transaction, RelayerSignTrait},
};

#[async_trait]
#[cfg_attr(test, automock)]
pub trait AdmissionGateTrait: Send + Sync {
    /// Admits a base64 encoded, sender-signed transaction and returns its transfer id.
    async fn admit(
        &self,
        encoded_transaction: &str,
        expiry_height: u64,
    ) -> Result<String, AdmissionError>;
}

enum Admission {
    Accepted(String),
    Duplicate(String),
}

pub struct AdmissionGate<TR, IR, S>
where
    TR: TransferRepository,
    IR: IdentityRegistry,
    S: RelayerSignTrait,
{
    transfer_repository: Arc<TR>,
    identity_registry: Arc<IR>,
    signer: Arc<S>,
    policy: TransferAssetPolicy,
}

impl<TR, IR, S> AdmissionGate<TR, IR, S>
where
    TR: TransferRepository,
    IR: IdentityRegistry,
    S: RelayerSignTrait,
{
    pub fn new(
        transfer_repository: Arc<TR>,
        identity_registry: Arc<IR>,
        signer: Arc<S>,
        policy: TransferAssetPolicy,
    ) -> Self {
        Self {
            transfer_repository,
            identity_registry,
            signer,
            policy,
        }
    }

    async fn admit_impl(
        &self,
        encoded_transaction: &str,
        expiry_height: u64,
    ) -> Result<Admission, AdmissionError> {
        let transaction = decode_transfer_transaction(encoded_transaction)
            .map_err(AdmissionError::MalformedTransaction)?;

        if let Some(existing) = self.find_existing(&transaction).await? {
            return Ok(Admission::Duplicate(existing.id));
        }

        let relayer = self.signer.pubkey();
        Self::validate_structure(&transaction, &relayer)?;

        let validated = TransferInstructionValidator::validate(&transaction.message, &self.policy)?;
        Self::validate_signer_set(&transaction, &relayer, &validated)?;
        Self::validate_writable_accounts(&transaction, &relayer, &validated)?;

        self.validate_identities(&validated).await?;
        Self::validate_signatures(&transaction, &validated)?;

        let (signed, network_signature) =
            sign_sdk_transaction(self.signer.as_ref(), transaction).await?;
        let id = transfer_id(&signed).ok_or(AdmissionError::MissingSenderSignature)?;
        let encoded = EncodedSerializedTransaction::try_from(&signed)
            .map_err(AdmissionError::MalformedTransaction)?;

        let record = TransferRecord::from(NewTransferRecord {
            id,
            signature: network_signature.to_string(),
            encoded_transaction: encoded.into_inner(),
            sender: validated.sender.to_string(),
            recipient: validated.recipient.to_string(),
            mint: self.policy.mint.to_string(),
            amount: validated.amount,
            recent_blockhash: signed.message.recent_blockhash.to_string(),
            expiry_height,
        });

        match self.transfer_repository.create_if_absent(record).await? {
            CreateOutcome::Created(record) => {
                info!(
                    tx_id = %record.id,
                    sender = %record.sender,
                    recipient = %record.recipient,
                    amount = record.amount,
                    expiry_height = record.expiry_height,
                    "transfer accepted"
                );
                Ok(Admission::Accepted(record.id))
            }
            CreateOutcome::Existing(record) => Ok(Admission::Duplicate(record.id)),
        }
    }

    /// Fast path for client retries: an already stored transfer whose sender
    /// signature verifies is returned without running the full check list.
    async fn find_existing(
        &self,
        transaction: &SolanaTransaction,
    ) -> Result<Option<TransferRecord>, AdmissionError> {
        let Some(id) = transfer_id(transaction) else {
            return Ok(None);
        };
        let Some(existing) = self.transfer_repository.get_by_id(&id).await? else {
            return Ok(None);
        };

        if existing.sender == sender_key(transaction).to_string()
            && sender_signature_verifies(transaction)
        {
            Ok(Some(existing))
        } else {
            Ok(None)
        }
    }

    fn validate_structure(
        transaction: &SolanaTransaction,
        relayer: &Pubkey,
    ) -> Result<(), AdmissionError> {
        TransferInstructionValidator::validate_instruction_count(&transaction.message)?;

        let fee_payer = transaction.message.account_keys.first().ok_or_else(|| {
            AdmissionError::MalformedTransaction("Transaction has no accounts".to_string())
        })?;
        if fee_payer != relayer {
            return Err(AdmissionError::FeePayerMismatch {
                expected: relayer.to_string(),
                found: fee_payer.to_string(),
            });
        }

        if transaction.message.recent_blockhash == Hash::default() {
            return Err(AdmissionError::MissingRecencyMarker);
        }

        let num_signers = transaction.message.header.num_required_signatures as usize;
        if num_signers != EXPECTED_SIGNER_COUNT {
            return Err(AdmissionError::UnexpectedSigner(format!(
                "expected {EXPECTED_SIGNER_COUNT} signers, found {num_signers}"
            )));
        }
        Ok(())
    }

    /// Signers must be exactly `[relayer, sender]`.
    fn validate_signer_set(
        transaction: &SolanaTransaction,
        relayer: &Pubkey,
        validated: &ValidatedTransfer,
    ) -> Result<(), AdmissionError> {
        let signers = &transaction.message.account_keys[..EXPECTED_SIGNER_COUNT];
        if signers != [*relayer, validated.sender] {
            return Err(AdmissionError::UnexpectedSigner(format!(
                "signers {:?} are not [relayer, sender]",
                signers.iter().map(|s| s.to_string()).collect::<Vec<_>>()
            )));
        }
        Ok(())
    }

    fn validate_writable_accounts(
        transaction: &SolanaTransaction,
        relayer: &Pubkey,
        validated: &ValidatedTransfer,
    ) -> Result<(), AdmissionError> {
        let allowed: HashSet<Pubkey> = [
            *relayer,
            validated.sender,
            validated.sender_token_account,
            validated.recipient_token_account,
        ]
        .into_iter()
        .collect();

        let message = &transaction.message;
        for (index, key) in message.account_keys.iter().enumerate() {
            if message.is_maybe_writable(index, None) && !allowed.contains(key) {
                return Err(AdmissionError::UnexpectedWritableAccount(key.to_string()));
            }
        }
        Ok(())
    }

    async fn validate_identities(&self, validated: &ValidatedTransfer) -> Result<(), AdmissionError> {
        let sender = validated.sender.to_string();
        let recipient = validated.recipient.to_string();

        if !self.identity_registry.is_registered(&sender).await? {
            return Err(AdmissionError::SenderNotRegistered(sender));
        }
        if !self.identity_registry.is_registered(&recipient).await? {
            return Err(AdmissionError::RecipientNotRegistered(recipient));
        }
        if !self.identity_registry.is_compliant(&sender).await? {
            return Err(AdmissionError::SenderNotCompliant(sender));
        }
        if !self.identity_registry.is_compliant(&recipient).await? {
            return Err(AdmissionError::RecipientNotCompliant(recipient));
        }
        Ok(())
    }

    fn validate_signatures(
        transaction: &SolanaTransaction,
        validated: &ValidatedTransfer,
    ) -> Result<(), AdmissionError> {
        let sender_signature = transaction.signatures[SENDER_SIGNER_INDEX];
        if sender_signature == Signature::default() {
            return Err(AdmissionError::MissingSenderSignature);
        }
        if !sender_signature_verifies(transaction) {
            return Err(AdmissionError::InvalidSenderSignature(
                validated.sender.to_string(),
            ));
        }
        if transaction.signatures[0] != Signature::default() {
            return Err(AdmissionError::PrematureRelayerSignature);
        }
        Ok(())
    }
}

fn sender_key(transaction: &SolanaTransaction) -> Pubkey {
    transaction
        .message
        .account_keys
        .get(SENDER_SIGNER_INDEX)
        .copied()
        .unwrap_or_default()
}

fn sender_signature_verifies(transaction: &SolanaTransaction) -> bool {
    let Some(signature) = transaction.signatures.get(SENDER_SIGNER_INDEX) else {
        return false;
    };
    let Some(sender) = transaction.message.account_keys.get(SENDER_SIGNER_INDEX) else {
        return false;
    };
    signature.verify(sender.as_ref(), &transaction.message_data())
}

#[async_trait]
impl<TR, IR, S> AdmissionGateTrait for AdmissionGate<TR, IR, S>
where
    TR: TransferRepository + 'static,
    IR: IdentityRegistry + 'static,
    S: RelayerSignTrait + 'static,
{
    async fn admit(
        &self,
        encoded_transaction: &str,
        expiry_height: u64,
    ) -> Result<String, AdmissionError> {
        match self.admit_impl(encoded_transaction, expiry_height).await {
            Ok(Admission::Accepted(id)) => {
                ADMISSIONS_TOTAL
                    .with_label_values(&["accepted", "none"])
                    .inc();
                Ok(id)
            }
            Ok(Admission::Duplicate(id)) => {
                debug!(tx_id = %id, "transfer already admitted, returning existing id");
                ADMISSIONS_TOTAL
                    .with_label_values(&["duplicate", "none"])
                    .inc();
                Ok(id)
            }
            Err(e) => {
                warn!(
                    reason = e.code(),
                    category = ?e.category(),
                    error = %e,
                    "transfer rejected"
                );
                ADMISSIONS_TOTAL
                    .with_label_values(&["rejected", e.code()])
                    .inc();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ErrorCategory, IdentityModel, RepositoryError, SignerError, TransferStatus},
        repositories::{
            InMemoryIdentityRegistry, InMemoryTransferRepository, MockIdentityRegistry,
            MockTransferRepository,
        },
        services::{LocalSigner, MockRelayerSignTrait},
        utils::base64_encode,
    };
    use solana_sdk::{
        instruction::{AccountMeta, Instruction},
        message::Message,
        signature::Keypair,
        signer::Signer,
    };
    use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

    struct Fixture {
        relayer: Keypair,
        sender: Keypair,
        recipient: Pubkey,
        policy: TransferAssetPolicy,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                relayer: Keypair::new(),
                sender: Keypair::new(),
                recipient: Pubkey::new_unique(),
                policy: TransferAssetPolicy::new(Pubkey::new_unique(), spl_token::id(), Some(6)),
            }
        }

        fn instructions(&self) -> Vec<Instruction> {
            vec![
                create_associated_token_account_idempotent(
                    &self.relayer.pubkey(),
                    &self.recipient,
                    &self.policy.mint,
                    &spl_token::id(),
                ),
                spl_token::instruction::transfer_checked(
                    &spl_token::id(),
                    &self.policy.holding_account(&self.sender.pubkey()),
                    &self.policy.mint,
                    &self.policy.holding_account(&self.recipient),
                    &self.sender.pubkey(),
                    &[],
                    10,
                    6,
                )
                .unwrap(),
            ]
        }

        fn transaction_with(&self, instructions: &[Instruction]) -> SolanaTransaction {
            let message = Message::new_with_blockhash(
                instructions,
                Some(&self.relayer.pubkey()),
                &Hash::new_unique(),
            );
            let mut tx = SolanaTransaction::new_unsigned(message);
            tx.partial_sign(&[&self.sender], tx.message.recent_blockhash);
            tx
        }

        fn transaction(&self) -> SolanaTransaction {
            self.transaction_with(&self.instructions())
        }

        fn registry(&self) -> InMemoryIdentityRegistry {
            InMemoryIdentityRegistry::from_identities(vec![
                IdentityModel::new(self.sender.pubkey().to_string(), true),
                IdentityModel::new(self.recipient.to_string(), true),
            ])
        }

        fn gate(
            &self,
            repo: Arc<InMemoryTransferRepository>,
            registry: InMemoryIdentityRegistry,
        ) -> AdmissionGate<InMemoryTransferRepository, InMemoryIdentityRegistry, LocalSigner>
        {
            AdmissionGate::new(
                repo,
                Arc::new(registry),
                Arc::new(LocalSigner::new(self.relayer.insecure_clone())),
                self.policy.clone(),
            )
        }
    }

    fn encode(tx: &SolanaTransaction) -> String {
        base64_encode(&bincode::serialize(tx).unwrap())
    }

    #[tokio::test]
    async fn test_admit_valid_transfer() {
        let f = Fixture::new();
        let repo = Arc::new(InMemoryTransferRepository::new());
        let gate = f.gate(repo.clone(), f.registry());
        let tx = f.transaction();

        let id = gate.admit(&encode(&tx), 1000).await.unwrap();

        assert_eq!(id, tx.signatures[1].to_string());
        let record = repo.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(record.status, TransferStatus::Accepted);
        assert_eq!(record.amount, 10);
        assert_eq!(record.expiry_height, 1000);
        assert_eq!(record.sender, f.sender.pubkey().to_string());
        assert_eq!(record.recipient, f.recipient.to_string());
        assert_eq!(record.recent_blockhash, tx.message.recent_blockhash.to_string());

        let stored = decode_transfer_transaction(&record.encoded_transaction).unwrap();
        assert!(stored.verify().is_ok());
        assert_eq!(stored.signatures[0].to_string(), record.signature);
        assert_eq!(stored.message, tx.message);
    }

    #[tokio::test]
    async fn test_resubmission_returns_same_id() {
        let f = Fixture::new();
        let repo = Arc::new(InMemoryTransferRepository::new());
        let gate = f.gate(repo.clone(), f.registry());
        let encoded = encode(&f.transaction());

        let first = gate.admit(&encoded, 1000).await.unwrap();
        let second = gate.admit(&encoded, 1000).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_admission_stores_one_record() {
        let f = Fixture::new();
        let repo = Arc::new(InMemoryTransferRepository::new());
        let gate = Arc::new(f.gate(repo.clone(), f.registry()));
        let encoded = encode(&f.transaction());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                let encoded = encoded.clone();
                tokio::spawn(async move { gate.admit(&encoded, 1000).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }
        assert_eq!(ids.len(), 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_skips_identity_checks() {
        let f = Fixture::new();
        let tx = f.transaction();
        let existing_id = tx.signatures[1].to_string();
        let sender = f.sender.pubkey().to_string();

        let mut repo = MockTransferRepository::new();
        repo.expect_get_by_id().returning(move |id| {
            let mut record = TransferRecord::from(NewTransferRecord {
                id: id.to_string(),
                signature: "net".to_string(),
                encoded_transaction: "AQ==".to_string(),
                sender: sender.clone(),
                recipient: "recipient".to_string(),
                mint: "mint".to_string(),
                amount: 10,
                recent_blockhash: "hash".to_string(),
                expiry_height: 1000,
            });
            record.status = TransferStatus::Confirmed;
            Box::pin(async move { Ok(Some(record)) })
        });
        repo.expect_create_if_absent().never();

        let mut registry = MockIdentityRegistry::new();
        registry.expect_is_registered().never();
        registry.expect_is_compliant().never();

        let gate = AdmissionGate::new(
            Arc::new(repo),
            Arc::new(registry),
            Arc::new(LocalSigner::new(f.relayer.insecure_clone())),
            f.policy.clone(),
        );

        let id = gate.admit(&encode(&tx), 1000).await.unwrap();
        assert_eq!(id, existing_id);
    }

    async fn admit_error(f: &Fixture, tx: &SolanaTransaction) -> AdmissionError {
        let gate = f.gate(Arc::new(InMemoryTransferRepository::new()), f.registry());
        gate.admit(&encode(tx), 1000).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_rejects_undecodable_input() {
        let f = Fixture::new();
        let gate = f.gate(Arc::new(InMemoryTransferRepository::new()), f.registry());

        let err = gate.admit("definitely not a transaction", 1000).await.unwrap_err();
        assert_eq!(err.code(), "MALFORMED_TRANSACTION");
        assert_eq!(err.category(), ErrorCategory::MalformedInput);
    }

    #[tokio::test]
    async fn test_rejects_three_instructions() {
        let f = Fixture::new();
        let mut instructions = f.instructions();
        instructions.push(instructions[1].clone());
        let tx = f.transaction_with(&instructions);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "INSTRUCTION_COUNT");
        assert_eq!(err.category(), ErrorCategory::MalformedInput);
    }

    #[tokio::test]
    async fn test_rejects_foreign_fee_payer() {
        let f = Fixture::new();
        let other_payer = Keypair::new();
        let message = Message::new_with_blockhash(
            &f.instructions(),
            Some(&other_payer.pubkey()),
            &Hash::new_unique(),
        );
        let mut tx = SolanaTransaction::new_unsigned(message);
        tx.partial_sign(&[&f.sender], tx.message.recent_blockhash);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "FEE_PAYER_MISMATCH");
    }

    #[tokio::test]
    async fn test_rejects_missing_blockhash() {
        let f = Fixture::new();
        let message =
            Message::new_with_blockhash(&f.instructions(), Some(&f.relayer.pubkey()), &Hash::default());
        let mut tx = SolanaTransaction::new_unsigned(message);
        tx.partial_sign(&[&f.sender], tx.message.recent_blockhash);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "MISSING_RECENCY_MARKER");
    }

    #[tokio::test]
    async fn test_rejects_additional_signer() {
        let f = Fixture::new();
        let extra_signer = Keypair::new();
        let mut instructions = f.instructions();
        instructions[1]
            .accounts
            .push(AccountMeta::new_readonly(extra_signer.pubkey(), true));
        let message = Message::new_with_blockhash(
            &instructions,
            Some(&f.relayer.pubkey()),
            &Hash::new_unique(),
        );
        let mut tx = SolanaTransaction::new_unsigned(message);
        tx.partial_sign(&[&f.sender, &extra_signer], tx.message.recent_blockhash);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "UNEXPECTED_SIGNER");
        assert_eq!(err.category(), ErrorCategory::PolicyViolation);
    }

    #[tokio::test]
    async fn test_rejects_extra_writable_account() {
        let f = Fixture::new();
        let mut instructions = f.instructions();
        instructions[1]
            .accounts
            .push(AccountMeta::new(Pubkey::new_unique(), false));
        let tx = f.transaction_with(&instructions);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "UNEXPECTED_WRITABLE_ACCOUNT");
    }

    #[tokio::test]
    async fn test_rejects_asset_substitution() {
        let f = Fixture::new();
        let mut instructions = f.instructions();
        instructions[1] = spl_token::instruction::transfer_checked(
            &spl_token::id(),
            &f.policy.holding_account(&f.sender.pubkey()),
            &Pubkey::new_unique(),
            &f.policy.holding_account(&f.recipient),
            &f.sender.pubkey(),
            &[],
            10,
            6,
        )
        .unwrap();
        let tx = f.transaction_with(&instructions);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "ASSET_MISMATCH");
    }

    #[tokio::test]
    async fn test_identity_rejections_are_distinct() {
        let f = Fixture::new();
        let tx = f.transaction();
        let sender = f.sender.pubkey().to_string();
        let recipient = f.recipient.to_string();

        let cases = vec![
            (vec![IdentityModel::new(recipient.clone(), true)], "SENDER_NOT_REGISTERED"),
            (vec![IdentityModel::new(sender.clone(), true)], "RECIPIENT_NOT_REGISTERED"),
            (
                vec![
                    IdentityModel::new(sender.clone(), false),
                    IdentityModel::new(recipient.clone(), true),
                ],
                "SENDER_NOT_COMPLIANT",
            ),
            (
                vec![
                    IdentityModel::new(sender.clone(), true),
                    IdentityModel::new(recipient.clone(), false),
                ],
                "RECIPIENT_NOT_COMPLIANT",
            ),
        ];

        for (identities, expected) in cases {
            let repo = Arc::new(InMemoryTransferRepository::new());
            let gate = f.gate(
                repo.clone(),
                InMemoryIdentityRegistry::from_identities(identities),
            );
            let err = gate.admit(&encode(&tx), 1000).await.unwrap_err();
            assert_eq!(err.code(), expected);
            assert_eq!(repo.count().await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_rejects_unsigned_sender() {
        let f = Fixture::new();
        let message = Message::new_with_blockhash(
            &f.instructions(),
            Some(&f.relayer.pubkey()),
            &Hash::new_unique(),
        );
        let tx = SolanaTransaction::new_unsigned(message);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "MISSING_SENDER_SIGNATURE");
    }

    #[tokio::test]
    async fn test_rejects_forged_sender_signature() {
        let f = Fixture::new();
        let mut tx = f.transaction();
        tx.signatures[1] = Keypair::new().sign_message(&tx.message_data());

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "INVALID_SENDER_SIGNATURE");
    }

    #[tokio::test]
    async fn test_rejects_premature_relayer_signature() {
        let f = Fixture::new();
        let mut tx = f.transaction();
        tx.partial_sign(&[&f.relayer], tx.message.recent_blockhash);

        let err = admit_error(&f, &tx).await;
        assert_eq!(err.code(), "PREMATURE_RELAYER_SIGNATURE");
        assert_eq!(err.category(), ErrorCategory::PolicyViolation);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let f = Fixture::new();
        let mut repo = MockTransferRepository::new();
        repo.expect_get_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        repo.expect_create_if_absent().returning(|_| {
            Box::pin(async { Err(RepositoryError::ConnectionError("down".to_string())) })
        });

        let gate = AdmissionGate::new(
            Arc::new(repo),
            Arc::new(f.registry()),
            Arc::new(LocalSigner::new(f.relayer.insecure_clone())),
            f.policy.clone(),
        );

        let err = gate.admit(&encode(&f.transaction()), 1000).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[tokio::test]
    async fn test_signer_failure_is_internal() {
        let f = Fixture::new();
        let relayer = f.relayer.pubkey();
        let mut signer = MockRelayerSignTrait::new();
        signer.expect_pubkey().return_const(relayer);
        signer.expect_sign().returning(|_| {
            Box::pin(async { Err(SignerError::SigningError("hsm offline".to_string())) })
        });

        let repo = Arc::new(InMemoryTransferRepository::new());
        let gate = AdmissionGate::new(
            repo.clone(),
            Arc::new(f.registry()),
            Arc::new(signer),
            f.policy.clone(),
        );

        let err = gate.admit(&encode(&f.transaction()), 1000).await.unwrap_err();
        assert_eq!(err.code(), "SIGNER_ERROR");
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
