//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `HOME_BANK_CODE` (optional): the "our bank" code, defaults to 100100
/// - `CHARGE_PERCENT` / `VAT_PERCENT` (optional): fee percentages
/// - `CHARGE_MIN` / `CHARGE_MAX` (optional): USD-normalized charge clamp
/// - `SUSPENSE_ACCOUNT_NUMBER`, `CHARGES_ACCOUNT_NUMBER`,
///   `VAT_ACCOUNT_NUMBER` (optional): internal GL account numbers
/// - `EXTERNAL_{USD,GBP,EUR,NGN}_GL_ACCOUNT_NUMBER` (optional): external
///   GL destinations, one per supported currency
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    /// Transfers whose beneficiary bank code equals this value stay internal.
    #[serde(default = "default_home_bank_code")]
    pub home_bank_code: String,

    #[serde(default = "default_charge_percent")]
    pub charge_percent: Decimal,

    #[serde(default = "default_vat_percent")]
    pub vat_percent: Decimal,

    #[serde(default = "default_charge_min")]
    pub charge_min: Decimal,

    #[serde(default = "default_charge_max")]
    pub charge_max: Decimal,

    #[serde(default = "default_suspense_account")]
    pub suspense_account_number: String,

    #[serde(default = "default_charges_account")]
    pub charges_account_number: String,

    #[serde(default = "default_vat_account")]
    pub vat_account_number: String,

    #[serde(default = "default_usd_gl_account")]
    pub external_usd_gl_account_number: String,

    #[serde(default = "default_gbp_gl_account")]
    pub external_gbp_gl_account_number: String,

    #[serde(default = "default_eur_gl_account")]
    pub external_eur_gl_account_number: String,

    #[serde(default = "default_ngn_gl_account")]
    pub external_ngn_gl_account_number: String,
}

fn default_port() -> u16 {
    3000
}

fn default_home_bank_code() -> String {
    "100100".to_string()
}

fn default_charge_percent() -> Decimal {
    Decimal::ONE
}

fn default_vat_percent() -> Decimal {
    // 7.5%
    Decimal::new(75, 1)
}

fn default_charge_min() -> Decimal {
    Decimal::TWO
}

fn default_charge_max() -> Decimal {
    Decimal::new(20, 0)
}

fn default_suspense_account() -> String {
    "9990000001".to_string()
}

fn default_charges_account() -> String {
    "9990000002".to_string()
}

fn default_vat_account() -> String {
    "9990000003".to_string()
}

fn default_usd_gl_account() -> String {
    "9990000004".to_string()
}

fn default_gbp_gl_account() -> String {
    "9990000005".to_string()
}

fn default_eur_gl_account() -> String {
    "9990000006".to_string()
}

fn default_ngn_gl_account() -> String {
    "9990000007".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_match_documented_values() {
        assert_eq!(default_home_bank_code(), "100100");
        assert_eq!(default_charge_percent(), dec!(1));
        assert_eq!(default_vat_percent(), dec!(7.5));
        assert_eq!(default_charge_min(), dec!(2));
        assert_eq!(default_charge_max(), dec!(20));
    }
}
