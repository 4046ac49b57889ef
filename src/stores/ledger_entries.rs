//! Postgres-backed ledger-entry journal.

use async_trait::async_trait;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::transient_account::{LedgerEntry, NewLedgerEntry};
use crate::stores::LedgerEntryStore;

pub struct PgLedgerEntryStore {
    pool: DbPool,
}

impl PgLedgerEntryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerEntryStore for PgLedgerEntryStore {
    async fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, AppError> {
        let inserted = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO transient_account_transactions (
                transfer_id, external_reference,
                debited_account, credited_account,
                entry_type, currency, amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(entry.transfer_id)
        .bind(&entry.external_reference)
        .bind(&entry.debited_account)
        .bind(&entry.credited_account)
        .bind(entry.entry_type.as_str())
        .bind(&entry.currency)
        .bind(entry.amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }
}
