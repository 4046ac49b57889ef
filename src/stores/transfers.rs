//! Postgres-backed transfer store: rows, status transitions, and the two
//! multi-statement posting transactions.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, map_unique_violation};
use crate::models::transfer::{NewTransfer, Transfer, TransferStatus};
use crate::stores::TransferStore;

/// Signal raised when any posting statement affects zero rows. The guards
/// are folded into the UPDATEs, so a zero-rows step cannot say which guard
/// failed - callers classify by substring.
pub const POSTING_FAILED: &str =
    "transaction posting failed: record not found, inactive, or insufficient balance";

pub struct PgTransferStore {
    pool: DbPool,
}

impl PgTransferStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Roll the transaction back unless the statement touched a row.
async fn require_rows(
    tx: Transaction<'_, Postgres>,
    rows: u64,
) -> Result<Transaction<'_, Postgres>, AppError> {
    if rows == 0 {
        tx.rollback().await?;
        return Err(AppError::Internal(POSTING_FAILED.to_string()));
    }
    Ok(tx)
}

#[async_trait]
impl TransferStore for PgTransferStore {
    async fn create(&self, transfer: NewTransfer) -> Result<Transfer, AppError> {
        let created = sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (
                external_reference, transaction_reference,
                debit_account_number, credit_account_number,
                beneficiary_bank_code, debit_bank_name, credit_bank_name,
                debit_currency, credit_currency,
                debit_amount, credit_amount, fcy_rate,
                charge_amount, vat_amount,
                narration, status, audit_payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(&transfer.external_reference)
        .bind(&transfer.transaction_reference)
        .bind(&transfer.debit_account_number)
        .bind(&transfer.credit_account_number)
        .bind(&transfer.beneficiary_bank_code)
        .bind(&transfer.debit_bank_name)
        .bind(&transfer.credit_bank_name)
        .bind(&transfer.debit_currency)
        .bind(&transfer.credit_currency)
        .bind(transfer.debit_amount)
        .bind(transfer.credit_amount)
        .bind(transfer.fcy_rate)
        .bind(transfer.charge_amount)
        .bind(transfer.vat_amount)
        .bind(&transfer.narration)
        .bind(transfer.status.as_str())
        .bind(&transfer.audit_payload)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        tracing::debug!(
            transfer_id = %created.id,
            transaction_reference = ?created.transaction_reference,
            "transfer created"
        );
        Ok(created)
    }

    async fn update(&self, transfer: &Transfer) -> Result<Transfer, AppError> {
        sqlx::query_as::<_, Transfer>(
            r#"
            UPDATE transfers
            SET external_reference = $2,
                transaction_reference = $3,
                debit_account_number = $4,
                credit_account_number = $5,
                beneficiary_bank_code = $6,
                debit_bank_name = $7,
                credit_bank_name = $8,
                debit_currency = $9,
                credit_currency = $10,
                debit_amount = $11,
                credit_amount = $12,
                fcy_rate = $13,
                charge_amount = $14,
                vat_amount = $15,
                narration = $16,
                status = $17,
                audit_payload = $18,
                updated_at = NOW(),
                processed_at = CASE
                    WHEN $17 IN ('SUCCESS', 'FAILED', 'CLOSED') THEN NOW()
                    ELSE processed_at
                END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(transfer.id)
        .bind(&transfer.external_reference)
        .bind(&transfer.transaction_reference)
        .bind(&transfer.debit_account_number)
        .bind(&transfer.credit_account_number)
        .bind(&transfer.beneficiary_bank_code)
        .bind(&transfer.debit_bank_name)
        .bind(&transfer.credit_bank_name)
        .bind(&transfer.debit_currency)
        .bind(&transfer.credit_currency)
        .bind(transfer.debit_amount)
        .bind(transfer.credit_amount)
        .bind(transfer.fcy_rate)
        .bind(transfer.charge_amount)
        .bind(transfer.vat_amount)
        .bind(&transfer.narration)
        .bind(&transfer.status)
        .bind(&transfer.audit_payload)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::AccountNotFound)
    }

    async fn update_status(&self, id: Uuid, status: TransferStatus) -> Result<(), AppError> {
        let rows = sqlx::query(
            r#"
            UPDATE transfers
            SET status = $2,
                updated_at = NOW(),
                processed_at = CASE
                    WHEN $2 IN ('SUCCESS', 'FAILED', 'CLOSED') THEN NOW()
                    ELSE processed_at
                END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::Internal(format!("transfer {id} not found")));
        }
        Ok(())
    }

    async fn get(
        &self,
        id: &str,
        transaction_reference: &str,
        external_reference: &str,
    ) -> Result<Transfer, AppError> {
        let id = id.trim();
        let tx_ref = transaction_reference.trim();
        let ext_ref = external_reference.trim();

        if id.is_empty() && tx_ref.is_empty() && ext_ref.is_empty() {
            return Err(AppError::Validation(
                "id or transactionReference or externalReference is required".to_string(),
            ));
        }

        sqlx::query_as::<_, Transfer>(
            r#"
            SELECT * FROM transfers
            WHERE ($1 <> '' AND id::text = $1)
               OR ($2 <> '' AND transaction_reference = $2)
               OR ($3 <> '' AND external_reference = $3)
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(id)
        .bind(tx_ref)
        .bind(ext_ref)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::AccountNotFound)
    }

    async fn post_internal(
        &self,
        debit_account: &str,
        total: Decimal,
        suspense_account: &str,
        suspense_amount: Decimal,
        credit_account: &str,
        credit_amount: Decimal,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Debit the sender by amount + charge + VAT.
        let rows = sqlx::query(
            r#"
            UPDATE accounts
            SET available_balance = available_balance - $2,
                ledger_balance = ledger_balance - $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND status = 'ACTIVE'
              AND available_balance >= $2
            "#,
        )
        .bind(debit_account)
        .bind(total)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        // 2. Credit the suspense. No currency guard: the suspense row is
        //    multi-currency and addressed by account number alone.
        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance + $2,
                updated_at = NOW()
            WHERE account_number = $1
            "#,
        )
        .bind(suspense_account)
        .bind(suspense_amount)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        // 3. Debit the suspense for the beneficiary leg.
        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance - $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND available_balance >= $2
            "#,
        )
        .bind(suspense_account)
        .bind(suspense_amount)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        // 4. Credit the beneficiary in their own currency.
        let rows = sqlx::query(
            r#"
            UPDATE accounts
            SET available_balance = available_balance + $2,
                ledger_balance = ledger_balance + $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND status = 'ACTIVE'
            "#,
        )
        .bind(credit_account)
        .bind(credit_amount)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        tx.commit().await?;

        tracing::debug!(
            debit_account = %debit_account,
            credit_account = %credit_account,
            %total,
            "internal posting committed"
        );
        Ok(())
    }

    async fn post_external(
        &self,
        debit_account: &str,
        total: Decimal,
        suspense_account: &str,
        beneficiary_amount: Decimal,
        external_account: &str,
        external_currency: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r#"
            UPDATE accounts
            SET available_balance = available_balance - $2,
                ledger_balance = ledger_balance - $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND status = 'ACTIVE'
              AND available_balance >= $2
            "#,
        )
        .bind(debit_account)
        .bind(total)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance + $2,
                updated_at = NOW()
            WHERE account_number = $1
            "#,
        )
        .bind(suspense_account)
        .bind(total)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance - $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND available_balance >= $2
            "#,
        )
        .bind(suspense_account)
        .bind(beneficiary_amount)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        // Funds owed to the external network accumulate on the per-currency
        // GL row; the currency guard catches misrouted destinations.
        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance + $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND UPPER(currency) = UPPER($3)
            "#,
        )
        .bind(external_account)
        .bind(beneficiary_amount)
        .bind(external_currency)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx = require_rows(tx, rows).await?;

        tx.commit().await?;

        tracing::debug!(
            debit_account = %debit_account,
            external_account = %external_account,
            %total,
            "external posting committed"
        );
        Ok(())
    }
}
