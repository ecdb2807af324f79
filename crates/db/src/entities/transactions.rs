//! `SeaORM` Entity for transactions table.
//!
//! Amounts are stored as integer minor units. Rows are append-only.

use banca_shared::types::{AccountId, Money, TransactionId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub concept: Option<String>,
    pub amount_minor: i64,
    pub origin_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::OriginId",
        to = "super::accounts::Column::Id",
        on_delete = "Restrict"
    )]
    Origin,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ReceiverId",
        to = "super::accounts::Column::Id",
        on_delete = "Restrict"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Typed primary key.
    #[must_use]
    pub const fn transaction_id(&self) -> TransactionId {
        TransactionId::new(self.id)
    }

    /// Amount as [`Money`].
    #[must_use]
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }

    /// Debited account, if any.
    #[must_use]
    pub fn origin(&self) -> Option<AccountId> {
        self.origin_id.map(AccountId::new)
    }

    /// Credited account, if any.
    #[must_use]
    pub fn receiver(&self) -> Option<AccountId> {
        self.receiver_id.map(AccountId::new)
    }
}
