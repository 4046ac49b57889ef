//! Customer account models and API request/response types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account lifecycle states. Only ACTIVE accounts can be posted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Frozen => "FROZEN",
            AccountStatus::Closed => "CLOSED",
        }
    }
}

/// Represents an account record from the database.
///
/// Balances are `NUMERIC` columns mapped to `Decimal` - monetary values
/// never pass through floating point. `available_balance <= ledger_balance`
/// in steady state and both are non-negative (CHECK constraints).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub customer_id: String,
    /// Exactly 10 ASCII digits, unique across all customer accounts.
    pub account_number: String,
    pub currency: String,
    pub available_balance: Decimal,
    pub ledger_balance: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active.as_str()
    }
}

/// Fields for a new account row. The store populates id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub customer_id: String,
    pub account_number: String,
    pub currency: String,
    pub available_balance: Decimal,
    pub ledger_balance: Decimal,
    pub status: AccountStatus,
}

/// Request body for creating a new account.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub customer_id: String,
    pub currency: String,
    #[serde(default)]
    pub initial_deposit: Option<Decimal>,
}

impl CreateAccountRequest {
    /// Validate field formats. Returns the joined per-field details on
    /// failure, matching the envelope's `errors` style.
    pub fn validate(&self) -> Result<(), String> {
        let mut errs = Vec::new();

        if self.customer_id.trim().is_empty() {
            errs.push("customerId is required");
        }
        let currency = self.currency.trim();
        if currency.len() != 3 {
            errs.push("currency must be 3 characters");
        }
        if let Some(deposit) = self.initial_deposit {
            if deposit < Decimal::ZERO {
                errs.push("initialDeposit cannot be negative");
            }
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(errs.join("; "))
        }
    }
}

/// Request body for depositing funds into an existing account.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub account_number: String,
    pub amount: Decimal,
}

/// Response body for account endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub customer_id: String,
    pub account_number: String,
    pub currency: String,
    pub available_balance: Decimal,
    pub ledger_balance: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            customer_id: account.customer_id,
            account_number: account.account_number,
            currency: account.currency,
            available_balance: account.available_balance,
            ledger_balance: account.ledger_balance,
            status: account.status,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
