//! Demo data seeder for local development.
//!
//! Creates two customers and two funded accounts. Running it twice is a
//! no-op: existing rows are looked up by name and identifier.
//!
//! Reads the same configuration as the server (`config/default.toml`,
//! `config/{RUN_MODE}.toml`, `BANCA__DATABASE__URL`).
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use banca_core::ledger::{NewAccount, SeedIncome};
use banca_db::migration::{Migrator, MigratorTrait};
use banca_db::repositories::{
    AccountRepository, CreateAccountInput, CreateCustomerInput, CustomerRepository,
};
use banca_shared::AppConfig;
use banca_shared::types::{CustomerId, Money};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::info;

const SEED_ACTOR: &str = "seeder";

/// `(customer, account identifier, initial amount)`.
const DEMO_ACCOUNTS: [(&str, &str, i64); 2] = [
    ("Ada Lovelace", "ES12 1111 11111", 5000),
    ("Grace Hopper", "ES12 3456 78910", 3000),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info,banca=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = banca_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    if config.database.run_migrations {
        Migrator::up(&db, None).await.context("Failed to apply migrations")?;
    }

    for (name, identifier, amount) in DEMO_ACCOUNTS {
        let owner = seed_customer(&db, name).await?;
        seed_account(&db, owner, identifier, Decimal::from(amount)).await?;
    }

    info!("Seeding complete");
    Ok(())
}

async fn seed_customer(db: &DatabaseConnection, name: &str) -> anyhow::Result<CustomerId> {
    let repo = CustomerRepository::new(db.clone());
    if let Some(existing) = repo.find_by_name(name).await? {
        info!(customer = name, "Customer already exists, skipping");
        return Ok(existing.customer_id());
    }

    let created = repo
        .create_customer(CreateCustomerInput {
            name: name.to_string(),
            actor: Some(SEED_ACTOR.to_string()),
        })
        .await
        .with_context(|| format!("Failed to create customer {name}"))?;
    info!(customer = name, id = created.id, "Customer created");
    Ok(created.customer_id())
}

async fn seed_account(
    db: &DatabaseConnection,
    owner: CustomerId,
    identifier: &str,
    amount: Decimal,
) -> anyhow::Result<()> {
    let repo = AccountRepository::new(db.clone());
    if repo.find_by_identifier(identifier).await?.is_some() {
        info!(identifier, "Account already exists, skipping");
        return Ok(());
    }

    let created = repo
        .create_account(CreateAccountInput {
            account: NewAccount {
                identifier: identifier.to_string(),
                owner,
                incomes: vec![SeedIncome {
                    concept: Some("Initial amount".to_string()),
                    amount: Money::new(amount),
                }],
            },
            actor: Some(SEED_ACTOR.to_string()),
        })
        .await
        .with_context(|| format!("Failed to create account {identifier}"))?;

    info!(
        identifier,
        id = created.account.id,
        balance = %created.balance().current,
        "Account created"
    );
    Ok(())
}
