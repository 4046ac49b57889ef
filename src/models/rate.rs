//! FX rate models and API request/response types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored FX rate for an ordered currency pair on a given date.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Rate {
    pub id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub rate_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Response body for rate lookups.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    pub id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub rate_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Rate> for RateResponse {
    fn from(rate: Rate) -> Self {
        Self {
            id: rate.id,
            from_currency: rate.from_currency,
            to_currency: rate.to_currency,
            rate: rate.rate,
            rate_date: rate.rate_date,
            created_at: rate.created_at,
        }
    }
}

/// Request body for converting an amount between currencies.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRateRequest {
    pub amount: Decimal,
    pub from_ccy: String,
    pub to_ccy: String,
}

/// Response body for a conversion: the converted amount plus the rate that
/// produced it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRateResponse {
    pub amount: Decimal,
    pub from_ccy: String,
    pub to_ccy: String,
    pub converted_amount: Decimal,
    pub rate_used: Decimal,
    pub rate_date: NaiveDate,
}
