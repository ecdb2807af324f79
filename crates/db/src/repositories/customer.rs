//! Customer repository.

use banca_core::ledger::LedgerError;
use banca_core::ledger::validation::validate_customer_name;
use banca_shared::types::CustomerId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::customers;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    NotFound(CustomerId),

    /// Input violates a ledger rule.
    #[error(transparent)]
    Invalid(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Display name.
    pub name: String,
    /// Actor recorded in `created_by` and `updated_by`.
    pub actor: Option<String>,
}

/// Customer repository.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the insert fails.
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        validate_customer_name(&input.name)?;

        let now = chrono::Utc::now();
        let customer = customers::ActiveModel {
            name: Set(input.name.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(input.actor.clone()),
            updated_by: Set(input.actor),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(customer_id = customer.id, "Customer created");
        Ok(customer)
    }

    /// Lists all customers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_customers(&self) -> Result<Vec<customers::Model>, CustomerError> {
        let customers = customers::Entity::find()
            .order_by_desc(customers::Column::CreatedAt)
            .order_by_desc(customers::Column::Id)
            .all(&self.db)
            .await?;
        Ok(customers)
    }

    /// Gets a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no customer has this ID.
    pub async fn get_customer(&self, id: CustomerId) -> Result<customers::Model, CustomerError> {
        customers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    /// Finds a customer by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<customers::Model>, CustomerError> {
        let customer = customers::Entity::find()
            .filter(customers::Column::Name.eq(name))
            .order_by_asc(customers::Column::Id)
            .one(&self.db)
            .await?;
        Ok(customer)
    }
}
