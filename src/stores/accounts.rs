//! Postgres-backed customer account store.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::account::{Account, NewAccount};
use crate::stores::AccountStore;

pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Classify a zero-rows-affected balance update by probing the row.
    async fn classify_zero_rows(
        &self,
        account_number: &str,
        debit: bool,
    ) -> AppError {
        match self.get_by_account_number(account_number).await {
            Ok(account) if !account.is_active() => {
                AppError::Validation("account is not active".to_string())
            }
            // Active account with zero rows affected: the only guard left
            // to fail on a debit is the balance predicate.
            Ok(_) if debit => AppError::InsufficientBalance,
            Ok(_) => AppError::AccountNotFound,
            Err(err) => err,
        }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (
                customer_id, account_number, currency,
                available_balance, ledger_balance, status
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&account.customer_id)
        .bind(&account.account_number)
        .bind(&account.currency)
        .bind(account.available_balance)
        .bind(account.ledger_balance)
        .bind(account.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            account_number = %created.account_number,
            customer_id = %created.customer_id,
            "account created"
        );
        Ok(created)
    }

    async fn get_by_account_number(&self, account_number: &str) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE account_number = $1")
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::AccountNotFound)
    }

    async fn exists_for_customer(
        &self,
        customer_id: &str,
        currency: &str,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM accounts
                WHERE customer_id = $1 AND UPPER(currency) = UPPER($2)
            )
            "#,
        )
        .bind(customer_id)
        .bind(currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn deposit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError> {
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
        .bind(account_number)
        .bind(amount)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(self.classify_zero_rows(account_number, false).await);
        }
        Ok(())
    }

    async fn debit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError> {
        // The balance predicate inside the UPDATE is the overdraft guard:
        // the row lock serializes concurrent debits and the loser sees zero
        // rows affected.
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
        .bind(account_number)
        .bind(amount)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(self.classify_zero_rows(account_number, true).await);
        }
        Ok(())
    }

    async fn credit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError> {
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
        .bind(account_number)
        .bind(amount)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(self.classify_zero_rows(account_number, false).await);
        }
        Ok(())
    }
}
