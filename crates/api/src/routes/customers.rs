//! Customer routes.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use banca_db::entities::customers;
use banca_db::repositories::{CreateCustomerInput, CustomerRepository};
use banca_shared::types::CustomerId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::Actor};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/{customer_id}", get(get_customer))
}

/// Request body for creating a customer.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
}

/// Response for a customer.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    /// Customer ID.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl From<customers::Model> for CustomerResponse {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// GET `/customers` - List customers, newest first.
async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let customers = CustomerRepository::new((*state.db).clone())
        .list_customers()
        .await?;

    let response: Vec<CustomerResponse> = customers.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// POST `/customers` - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let customer = CustomerRepository::new((*state.db).clone())
        .create_customer(CreateCustomerInput {
            name: payload.name,
            actor: actor.into_inner(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CustomerResponse::from(customer))))
}

/// GET `/customers/{customer_id}` - Get a customer.
async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = CustomerRepository::new((*state.db).clone())
        .get_customer(customer_id)
        .await?;

    Ok(Json(CustomerResponse::from(customer)))
}
