//! Postgres-backed tests for the store layer's transactional guarantees.
//!
//! These need a live database (`DATABASE_URL`) and are ignored by default:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/payments_test cargo test -- --ignored
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use payment_posting_service::db::{self, DbPool};
use payment_posting_service::error::AppError;
use payment_posting_service::models::account::{AccountStatus, NewAccount};
use payment_posting_service::models::transfer::{NewTransfer, TransferStatus};
use payment_posting_service::models::user::NewUser;
use payment_posting_service::stores::{
    AccountStore, InternalAccountNumbers, PgAccountStore, PgRateStore, PgTransferStore,
    PgTransientAccountStore, PgUserStore, RateStore, TransferStore, TransientAccountStore,
    UserStore,
};

static ACCOUNT_SEQ: AtomicU32 = AtomicU32::new(0);

async fn test_pool() -> DbPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    let pool = db::create_pool(&url).await.expect("connect to test database");
    db::run_migrations(&pool).await.expect("run migrations");
    pool
}

/// A fresh 10-digit account number unique within the run.
fn unique_number() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or(0) % 1_000_000;
    let seq = ACCOUNT_SEQ.fetch_add(1, Ordering::Relaxed) % 10_000;
    format!("{:06}{:04}", nanos, seq)
}

async fn seed_customer_account(pool: &DbPool, currency: &str, balance: Decimal) -> String {
    let users = PgUserStore::new(pool.clone());
    let customer_id = unique_number();
    users
        .create(NewUser {
            customer_id: customer_id.clone(),
            first_name: "Test".into(),
            middle_name: None,
            last_name: "Customer".into(),
            dob: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            phone_number: "+2348000000000".into(),
            id_type: "Passport".into(),
            id_number: "A1234567".into(),
            kyc_level: 2,
            transaction_pin_hash: "$2b$04$invalidhashforstoretests0000000000000000000000000000"
                .into(),
        })
        .await
        .expect("create test user");

    let accounts = PgAccountStore::new(pool.clone());
    let account_number = unique_number();
    accounts
        .create(NewAccount {
            customer_id,
            account_number: account_number.clone(),
            currency: currency.into(),
            available_balance: balance,
            ledger_balance: balance,
            status: AccountStatus::Active,
        })
        .await
        .expect("create test account");
    account_number
}

async fn seed_gl_accounts(pool: &DbPool) -> InternalAccountNumbers {
    let numbers = InternalAccountNumbers {
        suspense: unique_number(),
        charges: unique_number(),
        vat: unique_number(),
        usd_gl: unique_number(),
        gbp_gl: unique_number(),
        eur_gl: unique_number(),
        ngn_gl: unique_number(),
    };
    PgTransientAccountStore::new(pool.clone())
        .ensure_internal(&numbers)
        .await
        .expect("seed GL accounts");
    numbers
}

fn new_transfer(debit_account: &str, reference: String) -> NewTransfer {
    NewTransfer {
        external_reference: reference.clone(),
        transaction_reference: reference,
        debit_account_number: debit_account.into(),
        credit_account_number: None,
        beneficiary_bank_code: Some("100100".into()),
        debit_bank_name: Some("Grey Bank".into()),
        credit_bank_name: None,
        debit_currency: "USD".into(),
        credit_currency: "USD".into(),
        debit_amount: dec!(10),
        credit_amount: dec!(10),
        fcy_rate: Decimal::ONE,
        charge_amount: dec!(2),
        vat_amount: dec!(0.75),
        narration: Some("Salary".into()),
        status: TransferStatus::Pending,
        audit_payload: "{}".into(),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn concurrent_debits_never_overdraw() {
    let pool = test_pool().await;
    let account_number = seed_customer_account(&pool, "USD", dec!(100)).await;
    let store = Arc::new(PgAccountStore::new(pool.clone()));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        let account = account_number.clone();
        handles.push(tokio::spawn(
            async move { store.debit(&account, dec!(30)).await },
        ));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // 100 / 30 funds exactly three debits; every other attempt must lose
    // the row-level race and see insufficient balance.
    assert_eq!(successes, 3);
    let account = store.get_by_account_number(&account_number).await.unwrap();
    assert_eq!(account.available_balance, dec!(10));
    assert_eq!(account.ledger_balance, dec!(10));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn debit_distinguishes_missing_inactive_and_underfunded() {
    let pool = test_pool().await;
    let store = PgAccountStore::new(pool.clone());

    let err = store.debit("0000000000", dec!(1)).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound));

    let underfunded = seed_customer_account(&pool, "USD", dec!(5)).await;
    let err = store.debit(&underfunded, dec!(10)).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn update_status_is_idempotent_and_stamps_processed_at() {
    let pool = test_pool().await;
    let debit_account = seed_customer_account(&pool, "USD", dec!(100)).await;
    let store = PgTransferStore::new(pool.clone());

    let reference = payment_posting_service::reference::transaction_reference();
    let created = store
        .create(new_transfer(&debit_account, reference))
        .await
        .unwrap();
    assert_eq!(created.status, "PENDING");
    assert!(created.processed_at.is_none());

    store
        .update_status(created.id, TransferStatus::Success)
        .await
        .unwrap();
    let first = store.get(&created.id.to_string(), "", "").await.unwrap();
    assert_eq!(first.status, "SUCCESS");
    assert!(first.processed_at.is_some());

    store
        .update_status(created.id, TransferStatus::Success)
        .await
        .unwrap();
    let second = store.get(&created.id.to_string(), "", "").await.unwrap();
    assert_eq!(second.status, first.status);
    assert_eq!(second.debit_amount, first.debit_amount);
    assert!(second.processed_at.is_some());
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn duplicate_reference_is_a_distinct_error() {
    let pool = test_pool().await;
    let debit_account = seed_customer_account(&pool, "USD", dec!(100)).await;
    let store = PgTransferStore::new(pool.clone());

    let reference = payment_posting_service::reference::transaction_reference();
    store
        .create(new_transfer(&debit_account, reference.clone()))
        .await
        .unwrap();
    let err = store
        .create(new_transfer(&debit_account, reference))
        .await
        .unwrap_err();
    assert!(err.is_duplicate_reference());
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn internal_posting_moves_balances_atomically() {
    let pool = test_pool().await;
    let debit_account = seed_customer_account(&pool, "USD", dec!(1000)).await;
    let credit_account = seed_customer_account(&pool, "USD", dec!(500)).await;
    let gls = seed_gl_accounts(&pool).await;

    let transfers = PgTransferStore::new(pool.clone());
    let accounts = PgAccountStore::new(pool.clone());

    transfers
        .post_internal(
            &debit_account,
            dec!(55.75),
            &gls.suspense,
            dec!(50),
            &credit_account,
            dec!(50),
        )
        .await
        .unwrap();

    let debit = accounts.get_by_account_number(&debit_account).await.unwrap();
    let credit = accounts
        .get_by_account_number(&credit_account)
        .await
        .unwrap();
    assert_eq!(debit.available_balance, dec!(944.25));
    assert_eq!(credit.available_balance, dec!(550));

    // Deltas across the two customer legs differ by exactly the fees that
    // stayed on the debit side; the suspense in/out legs cancel.
    let debit_delta = dec!(1000) - debit.available_balance;
    let credit_delta = credit.available_balance - dec!(500);
    assert_eq!(debit_delta - credit_delta, dec!(5.75));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn underfunded_posting_rolls_back_every_leg() {
    let pool = test_pool().await;
    let debit_account = seed_customer_account(&pool, "USD", dec!(10)).await;
    let credit_account = seed_customer_account(&pool, "USD", dec!(500)).await;
    let gls = seed_gl_accounts(&pool).await;

    let transfers = PgTransferStore::new(pool.clone());
    let accounts = PgAccountStore::new(pool.clone());

    let err = transfers
        .post_internal(
            &debit_account,
            dec!(55.75),
            &gls.suspense,
            dec!(50),
            &credit_account,
            dec!(50),
        )
        .await
        .unwrap_err();
    let message = err.to_string().to_lowercase();
    assert!(message.contains("insufficient balance"));

    // Nothing moved.
    let debit = accounts.get_by_account_number(&debit_account).await.unwrap();
    let credit = accounts
        .get_by_account_number(&credit_account)
        .await
        .unwrap();
    assert_eq!(debit.available_balance, dec!(10));
    assert_eq!(credit.available_balance, dec!(500));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn seeded_rates_cover_all_supported_pairs() {
    let pool = test_pool().await;
    let store = PgRateStore::new(pool.clone());
    store.seed_defaults().await.unwrap();
    // Idempotent: a second seed must not fail or duplicate.
    store.seed_defaults().await.unwrap();

    for (from, to) in [
        ("USD", "NGN"),
        ("NGN", "USD"),
        ("EUR", "NGN"),
        ("NGN", "EUR"),
        ("GBP", "NGN"),
        ("NGN", "GBP"),
        ("EUR", "USD"),
        ("USD", "EUR"),
        ("EUR", "GBP"),
        ("GBP", "EUR"),
        ("GBP", "USD"),
        ("USD", "GBP"),
    ] {
        let rate = store.lookup(from, to).await.unwrap();
        assert!(rate.rate > Decimal::ZERO);
    }
}
