//! API error type and its JSON response.
//!
//! Every failure leaves the API as
//! `{"error": "<code>", "message": "<text>", "field": "<field>"}`
//! with `field` present only for field-scoped validation errors.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use banca_core::ledger::LedgerError;
use banca_db::{AccountError, CustomerError, TransferError};
use banca_shared::AppError;
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Returns the wrapped application error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err.into())
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        Self(match err {
            CustomerError::NotFound(id) => AppError::NotFound(format!("Customer {id} not found")),
            CustomerError::Invalid(e) => e.into(),
            CustomerError::Database(e) => AppError::Database(e.to_string()),
        })
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        Self(match err {
            AccountError::NotFound(id) => AppError::NotFound(format!("Account {id} not found")),
            AccountError::OwnerNotFound(id) => {
                AppError::field("owner", format!("Customer {id} does not exist"))
            }
            AccountError::DuplicateIdentifier(identifier) => AppError::field(
                "identifier",
                format!("An account with identifier '{identifier}' already exists"),
            ),
            AccountError::Invalid(e) => e.into(),
            AccountError::Database(e) => AppError::Database(e.to_string()),
        })
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        Self(match err {
            TransferError::OriginNotFound(id) => {
                AppError::NotFound(format!("Account {id} not found"))
            }
            TransferError::ReceiverNotFound(id) => {
                AppError::field("receiver", format!("Account {id} does not exist"))
            }
            TransferError::Rejected(e) => e.into(),
            TransferError::Database(e) => AppError::Database(e.to_string()),
        })
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let first = field_errors
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .and_then(|(field, errs)| errs.first().map(|e| (field, e)));

        match first {
            Some((field, err)) => {
                let message = err
                    .message
                    .as_ref()
                    .map_or_else(|| format!("Invalid value for {field}"), ToString::to_string);
                Self(AppError::field(field.to_string(), message))
            }
            None => Self(AppError::validation(errors.to_string())),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if err.is_client_error() {
            err.message().to_string()
        } else {
            error!(error = %err, "Request failed");
            "An internal error occurred".to_string()
        };

        let mut body = json!({
            "error": err.error_code(),
            "message": message,
        });
        if let Some(field) = err.field_name() {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}
