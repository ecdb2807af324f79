//! Initial ledger schema: customers, accounts and transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Identifier,
    OwnerId,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Concept,
    AmountMinor,
    OriginId,
    ReceiverId,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string_len(100).not_null())
                    .col(created_at(Customers::CreatedAt))
                    .col(created_at(Customers::UpdatedAt))
                    .col(ColumnDef::new(Customers::CreatedBy).string_len(150))
                    .col(ColumnDef::new(Customers::UpdatedBy).string_len(150))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Identifier)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::OwnerId).big_integer().not_null())
                    .col(created_at(Accounts::CreatedAt))
                    .col(created_at(Accounts::UpdatedAt))
                    .col(ColumnDef::new(Accounts::CreatedBy).string_len(150))
                    .col(ColumnDef::new(Accounts::UpdatedBy).string_len(150))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-owner_id")
                            .from(Accounts::Table, Accounts::OwnerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-owner_id")
                    .table(Accounts::Table)
                    .col(Accounts::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Concept).string_len(255))
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::OriginId).big_integer())
                    .col(ColumnDef::new(Transactions::ReceiverId).big_integer())
                    .col(created_at(Transactions::CreatedAt))
                    .col(created_at(Transactions::UpdatedAt))
                    .col(ColumnDef::new(Transactions::CreatedBy).string_len(150))
                    .col(ColumnDef::new(Transactions::UpdatedBy).string_len(150))
                    .check(Expr::col(Transactions::AmountMinor).gt(0))
                    .check(
                        Expr::col(Transactions::OriginId)
                            .is_not_null()
                            .or(Expr::col(Transactions::ReceiverId).is_not_null()),
                    )
                    .check(
                        Expr::col(Transactions::OriginId)
                            .ne(Expr::col(Transactions::ReceiverId)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-origin_id")
                            .from(Transactions::Table, Transactions::OriginId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-receiver_id")
                            .from(Transactions::Table, Transactions::ReceiverId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-origin_id")
                    .table(Transactions::Table)
                    .col(Transactions::OriginId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-receiver_id")
                    .table(Transactions::Table)
                    .col(Transactions::ReceiverId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        Ok(())
    }
}
