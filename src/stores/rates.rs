//! Postgres-backed FX rate store.

use async_trait::async_trait;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::rate::Rate;
use crate::stores::RateStore;

pub struct PgRateStore {
    pool: DbPool,
}

impl PgRateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn seed_defaults(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO rates (from_currency, to_currency, rate, rate_date) VALUES
                ('USD', 'NGN', 1338.38005900, CURRENT_DATE),
                ('NGN', 'USD', 0.00074717, CURRENT_DATE),
                ('EUR', 'NGN', 1580.48135373, CURRENT_DATE),
                ('NGN', 'EUR', 0.00063272, CURRENT_DATE),
                ('GBP', 'NGN', 1810.06486117, CURRENT_DATE),
                ('NGN', 'GBP', 0.00055247, CURRENT_DATE),
                ('EUR', 'USD', 1.18450000, CURRENT_DATE),
                ('USD', 'EUR', 0.84423808, CURRENT_DATE),
                ('EUR', 'GBP', 0.87240000, CURRENT_DATE),
                ('GBP', 'EUR', 1.14626318, CURRENT_DATE),
                ('GBP', 'USD', 1.35774874, CURRENT_DATE),
                ('USD', 'GBP', 0.73651330, CURRENT_DATE)
            ON CONFLICT (from_currency, to_currency, rate_date) DO NOTHING
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("default rates ensured");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Rate>, AppError> {
        let rates = sqlx::query_as::<_, Rate>(
            r#"
            SELECT * FROM rates
            ORDER BY rate_date DESC, from_currency ASC, to_currency ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    async fn lookup(&self, from_currency: &str, to_currency: &str) -> Result<Rate, AppError> {
        sqlx::query_as::<_, Rate>(
            r#"
            SELECT * FROM rates
            WHERE UPPER(from_currency) = UPPER($1)
              AND UPPER(to_currency) = UPPER($2)
            ORDER BY rate_date DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(from_currency)
        .bind(to_currency)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::RateNotFound)
    }
}
