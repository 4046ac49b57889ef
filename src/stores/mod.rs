//! Store traits and their Postgres implementations.
//!
//! Each store is a narrow trait consumed by the services, so every scenario
//! can be exercised against in-memory doubles. The `Pg*` implementations
//! hold a shared [`DbPool`](crate::db::DbPool) and issue single guarded
//! statements - mutual exclusion comes from row-level locks taken by the
//! database during UPDATEs, never from application locks.

pub mod accounts;
pub mod ledger_entries;
#[cfg(test)]
pub mod testing;
pub mod rates;
pub mod transfers;
pub mod transient_accounts;
pub mod users;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::{Account, NewAccount};
use crate::models::rate::Rate;
use crate::models::transfer::{NewTransfer, Transfer, TransferStatus};
use crate::models::transient_account::{LedgerEntry, NewLedgerEntry};
use crate::models::user::{NewUser, User};

pub use accounts::PgAccountStore;
pub use ledger_entries::PgLedgerEntryStore;
pub use rates::PgRateStore;
pub use transfers::PgTransferStore;
pub use transient_accounts::PgTransientAccountStore;
pub use users::PgUserStore;

/// The well-known GL account numbers seeded at startup.
#[derive(Debug, Clone)]
pub struct InternalAccountNumbers {
    pub suspense: String,
    pub charges: String,
    pub vat: String,
    pub usd_gl: String,
    pub gbp_gl: String,
    pub eur_gl: String,
    pub ngn_gl: String,
}

/// Customer account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: NewAccount) -> Result<Account, AppError>;

    /// `AccountNotFound` when no row matches.
    async fn get_by_account_number(&self, account_number: &str) -> Result<Account, AppError>;

    async fn exists_for_customer(
        &self,
        customer_id: &str,
        currency: &str,
    ) -> Result<bool, AppError>;

    /// `available += amount; ledger += amount`, guarded by ACTIVE status.
    async fn deposit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError>;

    /// `available -= amount; ledger -= amount`, guarded by ACTIVE status and
    /// sufficient available balance. The predicate lives inside the UPDATE,
    /// so concurrent debits of the same account serialize on the row lock.
    async fn debit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError>;

    /// `available += amount; ledger += amount`, guarded by ACTIVE status.
    async fn credit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError>;
}

/// GL-row persistence: suspense, fee accounts, external GLs.
#[async_trait]
pub trait TransientAccountStore: Send + Sync {
    /// Idempotently seed the seven well-known GL rows.
    async fn ensure_internal(&self, numbers: &InternalAccountNumbers) -> Result<(), AppError>;

    /// `available += amount`, guarded by a case-insensitive currency match.
    async fn credit(
        &self,
        account_number: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<(), AppError>;

    /// `available -= amount`, guarded by sufficient balance.
    async fn debit(
        &self,
        account_number: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<(), AppError>;

    /// One transaction: debit the suspense by `charge_src + vat_src`, then
    /// credit the charges and VAT GLs by the USD-converted fee amounts. Any
    /// zero-rows step rolls the whole transaction back.
    #[allow(clippy::too_many_arguments)]
    async fn settle_fees_to_usd(
        &self,
        suspense_account: &str,
        charge_src: Decimal,
        vat_src: Decimal,
        charges_account: &str,
        vat_account: &str,
        charge_usd: Decimal,
        vat_usd: Decimal,
    ) -> Result<(), AppError>;
}

/// Append-only journal. No read path - balances are authoritative.
#[async_trait]
pub trait LedgerEntryStore: Send + Sync {
    async fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, AppError>;
}

/// Transfer rows, status transitions, and the atomic posting transactions.
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// `DuplicateReference` on a unique violation of either reference
    /// column; the engine retries with a fresh reference.
    async fn create(&self, transfer: NewTransfer) -> Result<Transfer, AppError>;

    async fn update(&self, transfer: &Transfer) -> Result<Transfer, AppError>;

    /// Stamps `processed_at` when the new status is SUCCESS, FAILED, or
    /// CLOSED. Re-applying the same status is a no-op in effect.
    async fn update_status(&self, id: Uuid, status: TransferStatus) -> Result<(), AppError>;

    /// Lookup by the first non-empty of id / transaction reference /
    /// external reference.
    async fn get(
        &self,
        id: &str,
        transaction_reference: &str,
        external_reference: &str,
    ) -> Result<Transfer, AppError>;

    /// Internal posting: debit customer by `total`, credit suspense by
    /// `suspense_amount`, debit suspense by `suspense_amount`, credit the
    /// beneficiary by `credit_amount` - all inside one DB transaction.
    async fn post_internal(
        &self,
        debit_account: &str,
        total: Decimal,
        suspense_account: &str,
        suspense_amount: Decimal,
        credit_account: &str,
        credit_amount: Decimal,
    ) -> Result<(), AppError>;

    /// External posting: debit customer by `total`, credit suspense by
    /// `total`, debit suspense by `beneficiary_amount`, credit the external
    /// GL (currency-guarded) by `beneficiary_amount` - one DB transaction.
    #[allow(clippy::too_many_arguments)]
    async fn post_external(
        &self,
        debit_account: &str,
        total: Decimal,
        suspense_account: &str,
        beneficiary_amount: Decimal,
        external_account: &str,
        external_currency: &str,
    ) -> Result<(), AppError>;
}

/// FX rate persistence. Seeded at startup, read-only afterwards.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Idempotently insert the default rate table for today.
    async fn seed_defaults(&self) -> Result<(), AppError>;

    /// All rates, ordered `(rate_date desc, from asc, to asc)`.
    async fn list(&self) -> Result<Vec<Rate>, AppError>;

    /// Most recent rate for the ordered pair; `RateNotFound` on a miss.
    async fn lookup(&self, from_currency: &str, to_currency: &str) -> Result<Rate, AppError>;
}

/// Customer identity persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<User, AppError>;

    async fn get_by_customer_id(&self, customer_id: &str) -> Result<User, AppError>;

    /// The stored bcrypt hash for a customer; `UserNotFound` on a miss.
    async fn get_pin_hash(&self, customer_id: &str) -> Result<String, AppError>;
}
