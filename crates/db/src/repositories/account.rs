//! Account repository: opening accounts and reading derived balances.

use std::collections::HashMap;

use banca_core::ledger::{AccountBalance, Direction, LedgerError, LedgerService, NewAccount};
use banca_shared::types::{AccountId, CustomerId, Money};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{accounts, customers, transactions};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Owner does not exist.
    #[error("Customer not found: {0}")]
    OwnerNotFound(CustomerId),

    /// Identifier already taken.
    #[error("Account identifier '{0}' already exists")]
    DuplicateIdentifier(String),

    /// Input violates a ledger rule.
    #[error(transparent)]
    Invalid(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for opening an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Identifier, owner and seed incomes.
    pub account: NewAccount,
    /// Actor recorded in `created_by` and `updated_by`.
    pub actor: Option<String>,
}

/// Account with the transactions that reference it.
#[derive(Debug, Clone)]
pub struct AccountWithTransactions {
    /// The account record.
    pub account: accounts::Model,
    /// Transactions where the account is receiver, oldest first.
    pub incomes: Vec<transactions::Model>,
    /// Transactions where the account is origin, oldest first.
    pub payments: Vec<transactions::Model>,
}

impl AccountWithTransactions {
    /// Ids of income transactions.
    #[must_use]
    pub fn income_ids(&self) -> Vec<i64> {
        self.incomes.iter().map(|t| t.id).collect()
    }

    /// Ids of payment transactions.
    #[must_use]
    pub fn payment_ids(&self) -> Vec<i64> {
        self.payments.iter().map(|t| t.id).collect()
    }

    /// Balance derived from the loaded transactions.
    #[must_use]
    pub fn balance(&self) -> AccountBalance {
        let incomes: Money = self.incomes.iter().map(transactions::Model::amount).sum();
        let payments: Money = self.payments.iter().map(transactions::Model::amount).sum();
        AccountBalance::from_totals(self.account.account_id(), incomes, payments)
    }
}

/// One row of an account history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The transaction.
    pub transaction: transactions::Model,
    /// Direction relative to the requested account.
    pub direction: Direction,
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens an account together with its seed incomes.
    ///
    /// This is the only way to create an account: the account row and every
    /// seed income are written in one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are no seed incomes, or one of them is invalid
    /// - The owner does not exist
    /// - The identifier is already taken
    /// - Database operation fails
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<AccountWithTransactions, AccountError> {
        LedgerService::validate_new_account(&input.account)?;
        let NewAccount {
            identifier,
            owner,
            incomes,
        } = input.account;
        let identifier = identifier.trim().to_string();

        let txn = self.db.begin().await?;

        if customers::Entity::find_by_id(owner.into_inner())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(AccountError::OwnerNotFound(owner));
        }

        let existing = accounts::Entity::find()
            .filter(accounts::Column::Identifier.eq(&identifier))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateIdentifier(identifier));
        }

        let now = chrono::Utc::now();
        // A concurrent create can still win the unique index after the check.
        let account = accounts::ActiveModel {
            identifier: Set(identifier.clone()),
            owner_id: Set(owner.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(input.actor.clone()),
            updated_by: Set(input.actor.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|err| duplicate_identifier_or(err, &identifier))?;

        let mut seeds = Vec::with_capacity(incomes.len());
        for income in incomes {
            let amount_minor = income.amount.to_minor().ok_or(LedgerError::AmountPrecision)?;
            let seed = insert_transaction(
                &txn,
                NewTransactionRow {
                    concept: income.concept,
                    amount_minor,
                    origin_id: None,
                    receiver_id: Some(account.id),
                    actor: input.actor.clone(),
                },
            )
            .await?;
            seeds.push(seed);
        }

        txn.commit().await?;

        info!(
            account_id = account.id,
            identifier = %account.identifier,
            seeds = seeds.len(),
            "Account opened"
        );

        Ok(AccountWithTransactions {
            account,
            incomes: seeds,
            payments: Vec::new(),
        })
    }

    /// Lists all accounts with their transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<AccountWithTransactions>, AccountError> {
        let accounts = accounts::Entity::find()
            .order_by_desc(accounts::Column::CreatedAt)
            .order_by_desc(accounts::Column::Id)
            .all(&self.db)
            .await?;

        if accounts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = accounts.iter().map(|a| a.id).collect();
        let rows = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::OriginId.is_in(ids.clone()))
                    .add(transactions::Column::ReceiverId.is_in(ids)),
            )
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        let mut incomes: HashMap<i64, Vec<transactions::Model>> = HashMap::new();
        let mut payments: HashMap<i64, Vec<transactions::Model>> = HashMap::new();
        for row in rows {
            if let Some(origin) = row.origin_id {
                payments.entry(origin).or_default().push(row.clone());
            }
            if let Some(receiver) = row.receiver_id {
                incomes.entry(receiver).or_default().push(row);
            }
        }

        Ok(accounts
            .into_iter()
            .map(|account| AccountWithTransactions {
                incomes: incomes.remove(&account.id).unwrap_or_default(),
                payments: payments.remove(&account.id).unwrap_or_default(),
                account,
            })
            .collect())
    }

    /// Gets an account with its incomes and payments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account has this ID.
    pub async fn get_account(&self, id: AccountId) -> Result<AccountWithTransactions, AccountError> {
        let account = self.find_account(id).await?;

        let incomes = transactions::Entity::find()
            .filter(transactions::Column::ReceiverId.eq(id.into_inner()))
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await?;
        let payments = transactions::Entity::find()
            .filter(transactions::Column::OriginId.eq(id.into_inner()))
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        Ok(AccountWithTransactions {
            account,
            incomes,
            payments,
        })
    }

    /// Aggregates the balance of an account in the database.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account has this ID.
    pub async fn balance(&self, id: AccountId) -> Result<AccountBalance, AccountError> {
        self.find_account(id).await?;
        Ok(balance_of(&self.db, id).await?)
    }

    /// Lists every transaction touching the account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account has this ID.
    pub async fn history(&self, id: AccountId) -> Result<Vec<HistoryEntry>, AccountError> {
        self.find_account(id).await?;

        let rows = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::OriginId.eq(id.into_inner()))
                    .add(transactions::Column::ReceiverId.eq(id.into_inner())),
            )
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|transaction| {
                Direction::relative_to(id, transaction.origin(), transaction.receiver())
                    .map(|direction| HistoryEntry {
                        transaction,
                        direction,
                    })
            })
            .collect())
    }

    /// Finds an account by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<accounts::Model>, AccountError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Identifier.eq(identifier))
            .one(&self.db)
            .await?;
        Ok(account)
    }

    async fn find_account(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))
    }
}

/// Maps a unique-index violation on `accounts.identifier` to
/// [`AccountError::DuplicateIdentifier`].
fn duplicate_identifier_or(err: DbErr, identifier: &str) -> AccountError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AccountError::DuplicateIdentifier(identifier.to_string())
        }
        _ => AccountError::Database(err),
    }
}

/// Aggregates incomes and payments of `account` on any connection.
///
/// Runs two `SUM` queries; pass a [`DatabaseTransaction`] to read the balance
/// inside an ongoing write.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn balance_of<C>(conn: &C, account: AccountId) -> Result<AccountBalance, DbErr>
where
    C: ConnectionTrait,
{
    let incomes = sum_minor(conn, transactions::Column::ReceiverId, account).await?;
    let payments = sum_minor(conn, transactions::Column::OriginId, account).await?;

    Ok(AccountBalance::from_totals(
        account,
        Money::from_minor(incomes),
        Money::from_minor(payments),
    ))
}

async fn sum_minor<C>(conn: &C, side: transactions::Column, account: AccountId) -> Result<i64, DbErr>
where
    C: ConnectionTrait,
{
    let total: Option<i64> = transactions::Entity::find()
        .select_only()
        .column_as(
            Expr::cust("CAST(COALESCE(SUM(amount_minor), 0) AS BIGINT)"),
            "total",
        )
        .filter(side.eq(account.into_inner()))
        .into_tuple::<i64>()
        .one(conn)
        .await?;
    Ok(total.unwrap_or(0))
}

/// Row values for a new transaction.
pub(crate) struct NewTransactionRow {
    pub concept: Option<String>,
    pub amount_minor: i64,
    pub origin_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub actor: Option<String>,
}

/// Inserts one transaction row inside `txn`.
pub(crate) async fn insert_transaction(
    txn: &DatabaseTransaction,
    row: NewTransactionRow,
) -> Result<transactions::Model, DbErr> {
    let now = chrono::Utc::now();
    transactions::ActiveModel {
        concept: Set(row.concept),
        amount_minor: Set(row.amount_minor),
        origin_id: Set(row.origin_id),
        receiver_id: Set(row.receiver_id),
        created_at: Set(now),
        updated_at: Set(now),
        created_by: Set(row.actor.clone()),
        updated_by: Set(row.actor),
        ..Default::default()
    }
    .insert(txn)
    .await
}
