//! Postgres-backed GL account store.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::db::DbPool;
use crate::error::AppError;
use crate::stores::{InternalAccountNumbers, TransientAccountStore};

pub struct PgTransientAccountStore {
    pool: DbPool,
}

impl PgTransientAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransientAccountStore for PgTransientAccountStore {
    async fn ensure_internal(&self, numbers: &InternalAccountNumbers) -> Result<(), AppError> {
        // The suspense row's currency is the MCY marker: it holds fees in
        // the source currency of whichever transfer parked them there.
        sqlx::query(
            r#"
            INSERT INTO transient_accounts (
                account_number, account_description, currency, available_balance
            ) VALUES
                ($1, 'Internal Suspense Account', 'MCY', 0),
                ($2, 'Internal Charges Account', 'USD', 0),
                ($3, 'Internal VAT Account', 'USD', 0),
                ($4, 'External USD GL Account', 'USD', 0),
                ($5, 'External GBP GL Account', 'GBP', 0),
                ($6, 'External EUR GL Account', 'EUR', 0),
                ($7, 'External NGN GL Account', 'NGN', 0)
            ON CONFLICT (account_number) DO NOTHING
            "#,
        )
        .bind(&numbers.suspense)
        .bind(&numbers.charges)
        .bind(&numbers.vat)
        .bind(&numbers.usd_gl)
        .bind(&numbers.gbp_gl)
        .bind(&numbers.eur_gl)
        .bind(&numbers.ngn_gl)
        .execute(&self.pool)
        .await?;

        tracing::info!("internal GL accounts ensured");
        Ok(())
    }

    async fn credit(
        &self,
        account_number: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<(), AppError> {
        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance + $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND UPPER(currency) = UPPER($3)
            "#,
        )
        .bind(account_number)
        .bind(amount)
        .bind(currency)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::AccountNotFound);
        }
        Ok(())
    }

    async fn debit(
        &self,
        account_number: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM transient_accounts
                WHERE account_number = $1 AND UPPER(currency) = UPPER($2)
            )
            "#,
        )
        .bind(account_number)
        .bind(currency)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(AppError::AccountNotFound);
        }

        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance - $2,
                updated_at = NOW()
            WHERE account_number = $1
              AND available_balance >= $2
            "#,
        )
        .bind(account_number)
        .bind(amount)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::InsufficientBalance);
        }
        Ok(())
    }

    async fn settle_fees_to_usd(
        &self,
        suspense_account: &str,
        charge_src: Decimal,
        vat_src: Decimal,
        charges_account: &str,
        vat_account: &str,
        charge_usd: Decimal,
        vat_usd: Decimal,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Sweep the combined fees off the suspense before crediting the
        // USD fee accounts.
        let rows = sqlx::query(
            r#"
            UPDATE transient_accounts
            SET available_balance = available_balance - ($2 + $3),
                updated_at = NOW()
            WHERE account_number = $1
              AND available_balance >= ($2 + $3)
            "#,
        )
        .bind(suspense_account)
        .bind(charge_src)
        .bind(vat_src)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows == 0 {
            tx.rollback().await?;
            return Err(AppError::InsufficientBalance);
        }

        for (account, amount) in [(charges_account, charge_usd), (vat_account, vat_usd)] {
            let rows = sqlx::query(
                r#"
                UPDATE transient_accounts
                SET available_balance = available_balance + $2,
                    updated_at = NOW()
                WHERE account_number = $1
                  AND UPPER(currency) = 'USD'
                "#,
            )
            .bind(account)
            .bind(amount)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if rows == 0 {
                tx.rollback().await?;
                return Err(AppError::AccountNotFound);
            }
        }

        tx.commit().await?;

        tracing::debug!(
            suspense = %suspense_account,
            %charge_usd,
            %vat_usd,
            "fees settled from suspense to USD GLs"
        );
        Ok(())
    }
}
