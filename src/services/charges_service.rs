//! Transaction charge and VAT calculation.
//!
//! Charges are a percentage of the amount, clamped to a configured
//! `[min, max]` band. The clamp is applied in USD-normalized space so the
//! band means the same thing in every currency; the clamped value is then
//! converted back to the source currency. VAT is a straight percentage of
//! the USD-normalized base with no clamp.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::charges::{ChargesRequest, ChargesResponse};
use crate::stores::RateStore;

/// The computed fee breakdown for one transfer, in the source currency.
#[derive(Debug, Clone)]
pub struct ChargesBreakdown {
    pub amount: Decimal,
    pub currency: String,
    pub charge: Decimal,
    pub vat: Decimal,
    /// amount + charge + vat - the full debit against the sender.
    pub total: Decimal,
}

pub struct ChargesService {
    rate_store: Arc<dyn RateStore>,
    charge_percent: Decimal,
    vat_percent: Decimal,
    charge_min: Decimal,
    charge_max: Decimal,
}

impl ChargesService {
    pub fn new(
        rate_store: Arc<dyn RateStore>,
        charge_percent: Decimal,
        vat_percent: Decimal,
        charge_min: Decimal,
        charge_max: Decimal,
    ) -> Self {
        Self {
            rate_store,
            charge_percent,
            vat_percent,
            charge_min,
            charge_max,
        }
    }

    /// Quote charges for the HTTP endpoint, mapping a missing pair onto the
    /// pair-specific not-found message.
    pub async fn get_charges_summary(
        &self,
        req: &ChargesRequest,
    ) -> Result<ChargesResponse, AppError> {
        let breakdown = self
            .get_charges(req.amount, &req.from_currency)
            .await
            .map_err(|err| match err {
                AppError::RateNotFound => AppError::RateNotFoundForPair,
                other => other,
            })?;

        Ok(ChargesResponse {
            amount: breakdown.amount,
            currency: breakdown.currency,
            charge: breakdown.charge,
            vat: breakdown.vat,
            sum_total: breakdown.total,
        })
    }

    /// Compute the charge, VAT, and total debit for `amount` in
    /// `from_currency`.
    pub async fn get_charges(
        &self,
        amount: Decimal,
        from_currency: &str,
    ) -> Result<ChargesBreakdown, AppError> {
        let currency = from_currency.trim().to_uppercase();

        if currency.is_empty() {
            return Err(AppError::Validation("fromCurrency is required".to_string()));
        }
        if currency.len() != 3 {
            return Err(AppError::Validation(
                "fromCurrency must be 3 characters".to_string(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        let hundred = Decimal::ONE_HUNDRED;
        let charge_percent = self.charge_percent / hundred;
        let vat_percent = self.vat_percent / hundred;

        // Normalize to USD for the clamp, and remember the rate that takes
        // the clamped value back. When distinct direct and inverse rates are
        // stored, src_to_usd * back != 1 and the effective charge drifts
        // from the nominal percentage - the clamp band is the invariant,
        // not the percentage.
        let (base, back) = if currency == "USD" {
            (amount, Decimal::ONE)
        } else {
            let src_to_usd = self.currency_to_usd_rate(&currency).await?;
            let usd_to_src = self.usd_to_currency_rate(&currency).await?;
            (amount * src_to_usd, usd_to_src)
        };

        let mut charge = base * charge_percent;
        if charge < self.charge_min {
            charge = self.charge_min;
        }
        if charge > self.charge_max {
            charge = self.charge_max;
        }
        let mut vat = base * vat_percent;

        if currency != "USD" {
            charge *= back;
            vat *= back;
        }

        let total = amount + charge + vat;

        Ok(ChargesBreakdown {
            amount,
            currency,
            charge,
            vat,
            total,
        })
    }

    /// Rate taking one unit of `currency` to USD: the stored direct rate if
    /// present, else the reciprocal of the stored inverse.
    async fn currency_to_usd_rate(&self, currency: &str) -> Result<Decimal, AppError> {
        match self.rate_store.lookup(currency, "USD").await {
            Ok(rate) => {
                if rate.rate <= Decimal::ZERO {
                    return Err(AppError::InvalidRate);
                }
                Ok(rate.rate)
            }
            Err(err) => {
                let inverse = match self.rate_store.lookup("USD", currency).await {
                    Ok(rate) => rate,
                    Err(_) => return Err(err),
                };
                if inverse.rate <= Decimal::ZERO {
                    return Err(AppError::InvalidRate);
                }
                Ok(Decimal::ONE / inverse.rate)
            }
        }
    }

    /// Rate taking one USD back to `currency`, with the same inverse
    /// fallback.
    async fn usd_to_currency_rate(&self, currency: &str) -> Result<Decimal, AppError> {
        match self.rate_store.lookup("USD", currency).await {
            Ok(rate) => {
                if rate.rate <= Decimal::ZERO {
                    return Err(AppError::InvalidRate);
                }
                Ok(rate.rate)
            }
            Err(err) => {
                let inverse = match self.rate_store.lookup(currency, "USD").await {
                    Ok(rate) => rate,
                    Err(_) => return Err(err),
                };
                if inverse.rate <= Decimal::ZERO {
                    return Err(AppError::InvalidRate);
                }
                Ok(Decimal::ONE / inverse.rate)
            }
        }
    }
}
