//! Account routes: opening, listing, transfers, balance and history.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use banca_core::ledger::{Direction, NewAccount, SeedIncome, TransferRequest};
use banca_db::entities::transactions;
use banca_db::repositories::{
    AccountRepository, AccountWithTransactions, CreateAccountInput, TransactionRepository,
    TransferInput,
};
use banca_shared::types::{AccountId, CustomerId, Money};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::Actor};

/// Timestamp format of `creation_datetime`.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/transfer", post(transfer))
        .route("/accounts/{account_id}/balance", get(get_balance))
        .route("/accounts/{account_id}/history", get(get_history))
}

// ============================================================================
// Requests
// ============================================================================

/// Seed income inside an account creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct SeedIncomeRequest {
    /// Optional concept.
    #[serde(default)]
    #[validate(length(max = 255, message = "Concept cannot exceed 255 characters"))]
    pub concept: Option<String>,
    /// Amount credited to the new account.
    pub amount: Money,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Unique identifier.
    #[validate(length(min = 1, max = 50, message = "Identifier must be between 1 and 50 characters"))]
    pub identifier: String,
    /// Owning customer.
    pub owner: CustomerId,
    /// Seed incomes; at least one is required.
    #[serde(default)]
    pub incomes: Vec<SeedIncomeRequest>,
}

/// Request body for a transfer. The origin is the account in the path.
#[derive(Debug, Deserialize, Validate)]
pub struct TransferBody {
    /// Optional concept.
    #[serde(default)]
    #[validate(length(max = 255, message = "Concept cannot exceed 255 characters"))]
    pub concept: Option<String>,
    /// Amount to move.
    pub amount: Money,
    /// Credited account; omitted for a withdrawal.
    #[serde(default)]
    pub receiver: Option<AccountId>,
}

/// Query parameters for account retrieval.
#[derive(Debug, Default, Deserialize)]
pub struct ExpandQuery {
    /// Comma-separated relations to inline: `incomes`, `payments`.
    pub expand: Option<String>,
}

impl ExpandQuery {
    fn names(&self) -> HashSet<&str> {
        self.expand
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: i64,
    /// Concept.
    pub concept: Option<String>,
    /// Amount.
    pub amount: Money,
    /// Debited account.
    pub origin: Option<i64>,
    /// Credited account.
    pub receiver: Option<i64>,
    /// Creation time, UTC.
    pub creation_datetime: String,
}

impl From<&transactions::Model> for TransactionResponse {
    fn from(model: &transactions::Model) -> Self {
        Self {
            id: model.id,
            concept: model.concept.clone(),
            amount: model.amount(),
            origin: model.origin_id,
            receiver: model.receiver_id,
            creation_datetime: format_datetime(model),
        }
    }
}

/// Expanded income; the receiver is the account itself and is omitted.
#[derive(Debug, Serialize)]
pub struct IncomeResponse {
    /// Transaction ID.
    pub id: i64,
    /// Concept.
    pub concept: Option<String>,
    /// Amount.
    pub amount: Money,
    /// Debited account.
    pub origin: Option<i64>,
    /// Creation time, UTC.
    pub creation_datetime: String,
}

impl From<&transactions::Model> for IncomeResponse {
    fn from(model: &transactions::Model) -> Self {
        Self {
            id: model.id,
            concept: model.concept.clone(),
            amount: model.amount(),
            origin: model.origin_id,
            creation_datetime: format_datetime(model),
        }
    }
}

/// Expanded payment; the origin is the account itself and is omitted.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Transaction ID.
    pub id: i64,
    /// Concept.
    pub concept: Option<String>,
    /// Amount.
    pub amount: Money,
    /// Credited account.
    pub receiver: Option<i64>,
    /// Creation time, UTC.
    pub creation_datetime: String,
}

impl From<&transactions::Model> for PaymentResponse {
    fn from(model: &transactions::Model) -> Self {
        Self {
            id: model.id,
            concept: model.concept.clone(),
            amount: model.amount(),
            receiver: model.receiver_id,
            creation_datetime: format_datetime(model),
        }
    }
}

/// Either transaction ids or inlined transactions.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RelatedTransactions<T> {
    /// Transaction ids only.
    Ids(Vec<i64>),
    /// Inlined transactions.
    Expanded(Vec<T>),
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: i64,
    /// Unique identifier.
    pub identifier: String,
    /// Owning customer ID.
    pub owner: i64,
    /// Income transactions.
    pub incomes: RelatedTransactions<IncomeResponse>,
    /// Payment transactions.
    pub payments: RelatedTransactions<PaymentResponse>,
    /// Current balance.
    pub current_amount: Money,
}

/// Response for an account balance.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Sum of outgoing amounts.
    pub payments: Money,
    /// Sum of incoming amounts.
    pub incomes: Money,
    /// `incomes - payments`.
    pub current_balance: Money,
}

/// One history row.
#[derive(Debug, Serialize)]
pub struct HistoryItemResponse {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: TransactionResponse,
    /// Direction relative to the requested account.
    pub direction: Direction,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/accounts` - List accounts, newest first.
async fn list_accounts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let accounts = AccountRepository::new((*state.db).clone())
        .list_accounts()
        .await?;

    let response: Vec<AccountResponse> = accounts
        .iter()
        .map(|a| account_response(a, &HashSet::new()))
        .collect();
    Ok(Json(response))
}

/// POST `/accounts` - Open an account with its seed incomes.
async fn create_account(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let input = CreateAccountInput {
        account: NewAccount {
            identifier: payload.identifier,
            owner: payload.owner,
            incomes: payload
                .incomes
                .into_iter()
                .map(|income| SeedIncome {
                    concept: income.concept,
                    amount: income.amount,
                })
                .collect(),
        },
        actor: actor.into_inner(),
    };

    let created = AccountRepository::new((*state.db).clone())
        .create_account(input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(account_response(&created, &HashSet::new())),
    ))
}

/// GET `/accounts/{account_id}` - Get an account, optionally expanding
/// `incomes` and `payments`.
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(query): Query<ExpandQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new((*state.db).clone())
        .get_account(account_id)
        .await?;

    Ok(Json(account_response(&account, &query.names())))
}

/// POST `/accounts/{account_id}/transfer` - Move money out of the account.
async fn transfer(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    actor: Actor,
    payload: Result<Json<TransferBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let repo = TransactionRepository::new((*state.db).clone(), state.locks.clone());
    let transaction = repo
        .transfer(TransferInput {
            request: TransferRequest {
                concept: payload.concept,
                amount: payload.amount,
                origin: Some(account_id),
                receiver: payload.receiver,
            },
            actor: actor.into_inner(),
        })
        .await?;

    info!(
        transaction_id = transaction.id,
        origin = %account_id,
        "Transfer created via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::from(&transaction)),
    ))
}

/// GET `/accounts/{account_id}/balance` - Derived totals.
async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let balance = AccountRepository::new((*state.db).clone())
        .balance(account_id)
        .await?;

    Ok(Json(BalanceResponse {
        payments: balance.payments,
        incomes: balance.incomes,
        current_balance: balance.current,
    }))
}

/// GET `/accounts/{account_id}/history` - Transactions, newest first.
async fn get_history(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let history = AccountRepository::new((*state.db).clone())
        .history(account_id)
        .await?;

    let response: Vec<HistoryItemResponse> = history
        .iter()
        .map(|entry| HistoryItemResponse {
            transaction: TransactionResponse::from(&entry.transaction),
            direction: entry.direction,
        })
        .collect();
    Ok(Json(response))
}

// ============================================================================
// Helper functions
// ============================================================================

fn account_response(account: &AccountWithTransactions, expand: &HashSet<&str>) -> AccountResponse {
    let incomes = if expand.contains("incomes") {
        RelatedTransactions::Expanded(account.incomes.iter().map(IncomeResponse::from).collect())
    } else {
        RelatedTransactions::Ids(account.income_ids())
    };
    let payments = if expand.contains("payments") {
        RelatedTransactions::Expanded(account.payments.iter().map(PaymentResponse::from).collect())
    } else {
        RelatedTransactions::Ids(account.payment_ids())
    };

    AccountResponse {
        id: account.account.id,
        identifier: account.account.identifier.clone(),
        owner: account.account.owner_id,
        incomes,
        payments,
        current_amount: account.balance().current,
    }
}

fn format_datetime(model: &transactions::Model) -> String {
    model.created_at.format(DATETIME_FORMAT).to_string()
}
