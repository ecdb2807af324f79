//! Integration tests for the transfer write path, including concurrent
//! transfers from one origin.
//!
//! Concurrency tests run on a file-backed SQLite database (WAL) with a
//! multi-connection pool, so transfers really overlap on the database.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use banca_core::ledger::{LedgerError, LedgerService, NewAccount, SeedIncome, TransferRequest};
use banca_db::entities::transactions;
use banca_db::migration::{Migrator, MigratorTrait};
use banca_db::repositories::{
    AccountRepository, CreateAccountInput, CreateCustomerInput, CustomerRepository, TransferInput,
    balance_of,
};
use banca_db::{AccountLocks, TransactionRepository, TransferError};
use banca_shared::types::{AccountId, Money};
use futures::future::join_all;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Set,
};

async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// Database file removed (with its WAL and SHM siblings) on drop.
struct TempDb(PathBuf);

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Migrated file-backed database behind a pool of several connections.
async fn setup_pooled() -> (DatabaseConnection, TempDb) {
    let path = std::env::temp_dir().join(format!(
        "banca-transfer-{}-{}.db",
        std::process::id(),
        NEXT_DB.fetch_add(1, Ordering::SeqCst)
    ));
    let file = TempDb(path);

    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", file.0.display()));
    options.max_connections(5).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    (db, file)
}

/// Creates one customer and an account per `(identifier, seed)` pair.
async fn open_accounts(db: &DatabaseConnection, seeds: &[(&str, rust_decimal::Decimal)]) -> Vec<AccountId> {
    let owner = CustomerRepository::new(db.clone())
        .create_customer(CreateCustomerInput {
            name: "Owner".to_string(),
            actor: None,
        })
        .await
        .unwrap()
        .customer_id();

    let repo = AccountRepository::new(db.clone());
    let mut ids = Vec::new();
    for (identifier, amount) in seeds {
        let created = repo
            .create_account(CreateAccountInput {
                account: NewAccount {
                    identifier: (*identifier).to_string(),
                    owner,
                    incomes: vec![SeedIncome {
                        concept: None,
                        amount: Money::new(*amount),
                    }],
                },
                actor: None,
            })
            .await
            .unwrap();
        ids.push(created.account.account_id());
    }
    ids
}

fn transfer(amount: rust_decimal::Decimal, origin: AccountId, receiver: Option<AccountId>) -> TransferInput {
    TransferInput {
        request: TransferRequest {
            concept: Some("transfer".to_string()),
            amount: Money::new(amount),
            origin: Some(origin),
            receiver,
        },
        actor: Some("tester".to_string()),
    }
}

async fn current(db: &DatabaseConnection, id: AccountId) -> Money {
    AccountRepository::new(db.clone())
        .balance(id)
        .await
        .unwrap()
        .current
}

#[tokio::test]
async fn test_transfer_moves_money() {
    let db = setup().await;
    let ids = open_accounts(&db, &[("A", dec!(5000)), ("B", dec!(3000))]).await;
    let (a, b) = (ids[0], ids[1]);
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());

    let recorded = repo.transfer(transfer(dec!(500), a, Some(b))).await.unwrap();

    assert_eq!(recorded.origin(), Some(a));
    assert_eq!(recorded.receiver(), Some(b));
    assert_eq!(recorded.amount(), Money::new(dec!(500)));
    assert_eq!(recorded.concept.as_deref(), Some("transfer"));
    assert_eq!(recorded.created_by.as_deref(), Some("tester"));
    assert_eq!(current(&db, a).await, Money::new(dec!(4500)));
    assert_eq!(current(&db, b).await, Money::new(dec!(3500)));
}

#[tokio::test]
async fn test_transfer_without_receiver_is_a_withdrawal() {
    let db = setup().await;
    let ids = open_accounts(&db, &[("A", dec!(100))]).await;
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());

    let recorded = repo.transfer(transfer(dec!(40), ids[0], None)).await.unwrap();

    assert_eq!(recorded.receiver(), None);
    assert_eq!(current(&db, ids[0]).await, Money::new(dec!(60)));
}

#[tokio::test]
async fn test_transfer_whole_balance_allowed() {
    let db = setup().await;
    let ids = open_accounts(&db, &[("A", dec!(100)), ("B", dec!(0.01))]).await;
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());

    repo.transfer(transfer(dec!(100), ids[0], Some(ids[1]))).await.unwrap();

    assert!(current(&db, ids[0]).await.is_zero());
}

#[tokio::test]
async fn test_insufficient_balance_leaves_balances_unchanged() {
    let db = setup().await;
    let ids = open_accounts(&db, &[("A", dec!(100)), ("B", dec!(50))]).await;
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());
    let before = transactions::Entity::find().count(&db).await.unwrap();

    let result = repo.transfer(transfer(dec!(100.01), ids[0], Some(ids[1]))).await;

    assert!(matches!(
        result,
        Err(TransferError::Rejected(LedgerError::InsufficientBalance { .. }))
    ));
    assert_eq!(transactions::Entity::find().count(&db).await.unwrap(), before);
    assert_eq!(current(&db, ids[0]).await, Money::new(dec!(100)));
    assert_eq!(current(&db, ids[1]).await, Money::new(dec!(50)));
}

#[tokio::test]
async fn test_rule_violations() {
    let db = setup().await;
    let ids = open_accounts(&db, &[("A", dec!(100)), ("B", dec!(50))]).await;
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());

    assert!(matches!(
        repo.transfer(transfer(dec!(0), ids[0], Some(ids[1]))).await,
        Err(TransferError::Rejected(LedgerError::NonPositiveAmount))
    ));
    assert!(matches!(
        repo.transfer(transfer(dec!(-5), ids[0], Some(ids[1]))).await,
        Err(TransferError::Rejected(LedgerError::NonPositiveAmount))
    ));
    assert!(matches!(
        repo.transfer(transfer(dec!(1.001), ids[0], Some(ids[1]))).await,
        Err(TransferError::Rejected(LedgerError::AmountPrecision))
    ));
    assert!(matches!(
        repo.transfer(transfer(dec!(10), ids[0], Some(ids[0]))).await,
        Err(TransferError::Rejected(LedgerError::SameOriginAndReceiver))
    ));
    assert_eq!(transactions::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_unknown_accounts() {
    let db = setup().await;
    let ids = open_accounts(&db, &[("A", dec!(100))]).await;
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());

    assert!(matches!(
        repo.transfer(transfer(dec!(10), AccountId::new(404), Some(ids[0]))).await,
        Err(TransferError::OriginNotFound(id)) if id == AccountId::new(404)
    ));
    assert!(matches!(
        repo.transfer(transfer(dec!(10), ids[0], Some(AccountId::new(404)))).await,
        Err(TransferError::ReceiverNotFound(id)) if id == AccountId::new(404)
    ));
}

#[tokio::test]
async fn test_concurrent_transfers_never_overdraw() {
    let (db, _file) = setup_pooled().await;
    let ids = open_accounts(&db, &[("A", dec!(100)), ("B", dec!(1))]).await;
    let (a, b) = (ids[0], ids[1]);
    let repo = Arc::new(TransactionRepository::new(db.clone(), AccountLocks::new()));

    // 15 transfers of 10 against a balance of 100: exactly 10 may succeed.
    let attempts = (0..15).map(|_| {
        let repo = Arc::clone(&repo);
        async move { repo.transfer(transfer(dec!(10), a, Some(b))).await }
    });
    let results = join_all(attempts).await;

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(TransferError::Rejected(LedgerError::InsufficientBalance { .. }))
            )
        })
        .count();

    assert_eq!(accepted, 10);
    assert_eq!(rejected, 5);
    assert!(current(&db, a).await.is_zero());
    assert_eq!(current(&db, b).await, Money::new(dec!(101)));
}

#[tokio::test]
async fn test_concurrent_transfers_across_tasks() {
    let (db, _file) = setup_pooled().await;
    let ids = open_accounts(&db, &[("A", dec!(50)), ("B", dec!(0.01))]).await;
    let (a, b) = (ids[0], ids[1]);
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.transfer(transfer(dec!(20), a, Some(b))).await })
        })
        .collect();

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(TransferError::Rejected(LedgerError::InsufficientBalance { .. })) => rejected += 1,
            Err(other) => panic!("unexpected transfer error: {other}"),
        }
    }

    assert_eq!(accepted, 2);
    assert_eq!(rejected, 6);
    assert_eq!(current(&db, a).await, Money::new(dec!(10)));
}

#[tokio::test]
async fn test_transfer_waits_for_origin_lock() {
    let (db, _file) = setup_pooled().await;
    let ids = open_accounts(&db, &[("A", dec!(100)), ("B", dec!(1))]).await;
    let (a, b) = (ids[0], ids[1]);
    let locks = AccountLocks::new();
    let repo = TransactionRepository::new(db.clone(), locks.clone());

    let guard = locks.acquire(a).await;
    let mut pending = tokio::spawn({
        let repo = repo.clone();
        async move { repo.transfer(transfer(dec!(10), a, Some(b))).await }
    });

    assert!(
        tokio::time::timeout(Duration::from_millis(200), &mut pending)
            .await
            .is_err()
    );
    assert_eq!(current(&db, a).await, Money::new(dec!(100)));

    drop(guard);
    pending.await.unwrap().unwrap();
    assert_eq!(current(&db, a).await, Money::new(dec!(90)));
}

#[tokio::test]
async fn test_unserialized_check_then_debit_overdraws() {
    let (db, _file) = setup_pooled().await;
    let ids = open_accounts(&db, &[("A", dec!(100)), ("B", dec!(1)), ("C", dec!(100))]).await;
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    // Both writers read the balance before either debits.
    let request = TransferRequest {
        concept: None,
        amount: Money::new(dec!(80)),
        origin: Some(a),
        receiver: Some(b),
    };
    let first = balance_of(&db, a).await.unwrap();
    let second = balance_of(&db, a).await.unwrap();
    assert!(LedgerService::validate_transfer(&request, Some(&first)).is_ok());
    assert!(LedgerService::validate_transfer(&request, Some(&second)).is_ok());

    for _ in 0..2 {
        let now = chrono::Utc::now();
        transactions::ActiveModel {
            amount_minor: Set(8000),
            origin_id: Set(Some(a.into_inner())),
            receiver_id: Set(Some(b.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
    }
    assert_eq!(current(&db, a).await, Money::new(dec!(-60)));

    // The same two debits through the repository: only one fits.
    let repo = TransactionRepository::new(db.clone(), AccountLocks::new());
    let results = join_all([
        repo.transfer(transfer(dec!(80), c, Some(b))),
        repo.transfer(transfer(dec!(80), c, Some(b))),
    ])
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(current(&db, c).await, Money::new(dec!(20)));
}
