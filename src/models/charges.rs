//! Charges quotation request/response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request body for quoting charges on an amount.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargesRequest {
    pub amount: Decimal,
    pub from_currency: String,
}

/// Response body for a charges quote.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargesResponse {
    pub amount: Decimal,
    pub currency: String,
    pub charge: Decimal,
    #[serde(rename = "vat")]
    pub vat: Decimal,
    pub sum_total: Decimal,
}
