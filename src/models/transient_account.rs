//! Internal GL account models and the ledger-entry journal row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Currency tag carried by the internal suspense account. Not an ISO code:
/// the suspense holds fees in whichever currency each transfer was debited
/// in, so stores must never currency-guard writes to it by account number.
pub const MULTI_CURRENCY: &str = "MCY";

/// A process-wide GL row: the suspense account, a fee account, or an
/// external GL. Created once at startup, never deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransientAccount {
    pub id: Uuid,
    pub account_number: String,
    pub account_description: String,
    pub currency: String,
    pub available_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Direction of a journal leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    Debit,
    Credit,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Debit => "DEBIT",
            EntryType::Credit => "CREDIT",
        }
    }
}

/// An immutable journal row recording one posting leg.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub external_reference: String,
    pub debited_account: String,
    pub credited_account: String,
    pub entry_type: String,
    pub currency: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new journal row.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub transfer_id: Uuid,
    pub external_reference: String,
    pub debited_account: String,
    pub credited_account: String,
    pub entry_type: EntryType,
    pub currency: String,
    pub amount: Decimal,
}
