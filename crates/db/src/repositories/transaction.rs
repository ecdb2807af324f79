//! Transaction repository: the transfer write path.
//!
//! A transfer is an atomic check-and-debit on the origin account:
//! 1. take the in-process lock for the origin
//! 2. open a database transaction and re-read the origin row `FOR UPDATE`
//! 3. aggregate the origin balance, validate, insert, commit
//!
//! Only the origin is locked. Crediting the receiver cannot overdraw it.

use banca_core::ledger::{LedgerError, LedgerService, TransferRequest};
use banca_shared::types::AccountId;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QuerySelect, TransactionTrait};
use tracing::{debug, info};

use super::account::{NewTransactionRow, balance_of, insert_transaction};
use crate::entities::{accounts, transactions};
use crate::locks::AccountLocks;

/// Error types for transfers.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Origin account not found.
    #[error("Account not found: {0}")]
    OriginNotFound(AccountId),

    /// Receiver account not found.
    #[error("Receiver account not found: {0}")]
    ReceiverNotFound(AccountId),

    /// Transfer violates a ledger rule.
    #[error(transparent)]
    Rejected(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a transfer.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Amount, concept and the two sides.
    pub request: TransferRequest,
    /// Actor recorded in `created_by` and `updated_by`.
    pub actor: Option<String>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    locks: AccountLocks,
}

impl TransactionRepository {
    /// Creates a new transaction repository sharing `locks` with every other
    /// writer in this process.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: AccountLocks) -> Self {
        Self { db, locks }
    }

    /// Records a transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The origin or the receiver does not exist
    /// - A ledger rule is violated (amount, same account, insufficient balance)
    /// - Database operation fails
    pub async fn transfer(&self, input: TransferInput) -> Result<transactions::Model, TransferError> {
        let TransferInput { request, actor } = input;

        if let Some(origin) = request.origin {
            self.ensure_account(origin, TransferError::OriginNotFound)
                .await?;
        }
        LedgerService::validate_transfer_shape(&request)?;
        if let Some(receiver) = request.receiver {
            self.ensure_account(receiver, TransferError::ReceiverNotFound)
                .await?;
        }
        let amount_minor = request.amount.to_minor().ok_or(LedgerError::AmountPrecision)?;

        let _guard = match request.origin {
            Some(origin) => Some(self.locks.acquire(origin).await),
            None => None,
        };

        let txn = self.db.begin().await?;

        let origin_balance = match request.origin {
            Some(origin) => {
                accounts::Entity::find_by_id(origin.into_inner())
                    .lock_exclusive()
                    .one(&txn)
                    .await?
                    .ok_or(TransferError::OriginNotFound(origin))?;
                Some(balance_of(&txn, origin).await?)
            }
            None => None,
        };

        if let Err(err) = LedgerService::validate_transfer(&request, origin_balance.as_ref()) {
            debug!(
                code = err.error_code(),
                origin = ?request.origin,
                amount = %request.amount,
                "Transfer rejected"
            );
            return Err(err.into());
        }

        let transaction = insert_transaction(
            &txn,
            NewTransactionRow {
                concept: request.concept,
                amount_minor,
                origin_id: request.origin.map(AccountId::into_inner),
                receiver_id: request.receiver.map(AccountId::into_inner),
                actor,
            },
        )
        .await?;

        txn.commit().await?;

        info!(
            transaction_id = transaction.id,
            origin = ?transaction.origin_id,
            receiver = ?transaction.receiver_id,
            amount = %transaction.amount(),
            "Transfer recorded"
        );

        Ok(transaction)
    }

    async fn ensure_account(
        &self,
        id: AccountId,
        missing: fn(AccountId) -> TransferError,
    ) -> Result<(), TransferError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| missing(id))
    }
}
