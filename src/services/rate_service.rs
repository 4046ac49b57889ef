//! Rate lookups and currency conversion.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::rate::{ConvertRateResponse, RateResponse};
use crate::stores::RateStore;

pub struct RateService {
    rate_store: Arc<dyn RateStore>,
}

impl RateService {
    pub fn new(rate_store: Arc<dyn RateStore>) -> Self {
        Self { rate_store }
    }

    /// All stored rates, newest first.
    pub async fn get_list(&self) -> Result<Vec<RateResponse>, AppError> {
        let rates = self.rate_store.list().await?;
        Ok(rates.into_iter().map(Into::into).collect())
    }

    /// Rate for one ordered pair. Same-currency pairs are never stored;
    /// a unit rate dated today is synthesized instead.
    pub async fn get_one(&self, from: &str, to: &str) -> Result<RateResponse, AppError> {
        let from_currency = from.trim().to_uppercase();
        let to_currency = to.trim().to_uppercase();

        if from_currency == to_currency {
            let now = Utc::now();
            return Ok(RateResponse {
                id: 0,
                from_currency,
                to_currency,
                rate: Decimal::ONE,
                rate_date: now.date_naive(),
                created_at: now,
            });
        }

        let rate = self.rate_store.lookup(&from_currency, &to_currency).await?;
        Ok(rate.into())
    }

    /// Convert `amount` from one currency to another using the stored
    /// direct rate. No inverse fallback here - the calling layers rely on
    /// direct rates being seeded for every supported pair.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<ConvertRateResponse, AppError> {
        let from_currency = from.trim().to_uppercase();
        let to_currency = to.trim().to_uppercase();

        if from_currency.is_empty() {
            return Err(AppError::Validation("fromCcy is required".to_string()));
        }
        if to_currency.is_empty() {
            return Err(AppError::Validation("toCcy is required".to_string()));
        }
        if from_currency.len() != 3 || to_currency.len() != 3 {
            return Err(AppError::Validation(
                "fromCcy and toCcy must be 3 characters".to_string(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        if from_currency == to_currency {
            return Ok(ConvertRateResponse {
                amount,
                from_ccy: from_currency,
                to_ccy: to_currency,
                converted_amount: amount,
                rate_used: Decimal::ONE,
                rate_date: Utc::now().date_naive(),
            });
        }

        let rate = self.rate_store.lookup(&from_currency, &to_currency).await?;
        if rate.rate.is_zero() {
            return Err(AppError::InvalidRate);
        }

        Ok(ConvertRateResponse {
            amount,
            from_ccy: from_currency,
            to_ccy: to_currency,
            converted_amount: amount * rate.rate,
            rate_used: rate.rate,
            rate_date: rate.rate_date,
        })
    }
}
