//! Transfer models: the database entity, the posting request with its
//! validation rules, and the response returned to clients.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Narrations accepted on a transfer request, compared case-insensitively.
const ALLOWED_NARRATIONS: &[&str] = &[
    "Travels and Holiday",
    "Salary",
    "Project charge",
    "Food and consumables",
    "Transportation",
    "Accomodation",
    "utility bill",
    "savings",
    "investment",
    "loan",
    "loan repayment",
    "others",
];

/// Transfer lifecycle.
///
/// `PENDING → SUCCESS → CLOSED`, with `FAILED` as the terminal sink for
/// aborted postings. A transfer left at SUCCESS means fee settlement is
/// still pending; FAILED and CLOSED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Pending,
    Success,
    Failed,
    Closed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failed => "FAILED",
            TransferStatus::Closed => "CLOSED",
        }
    }
}

/// Represents a transfer record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Transfer {
    pub id: Uuid,
    pub external_reference: Option<String>,
    pub transaction_reference: Option<String>,
    pub debit_account_number: String,
    pub credit_account_number: Option<String>,
    pub beneficiary_bank_code: Option<String>,
    pub debit_bank_name: Option<String>,
    pub credit_bank_name: Option<String>,
    pub debit_currency: String,
    pub credit_currency: String,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub fcy_rate: Decimal,
    pub charge_amount: Decimal,
    pub vat_amount: Decimal,
    pub narration: Option<String>,
    pub status: String,
    pub audit_payload: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Fields for a new transfer row. The stores populate id and timestamps.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub external_reference: String,
    pub transaction_reference: String,
    pub debit_account_number: String,
    pub credit_account_number: Option<String>,
    pub beneficiary_bank_code: Option<String>,
    pub debit_bank_name: Option<String>,
    pub credit_bank_name: Option<String>,
    pub debit_currency: String,
    pub credit_currency: String,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub fcy_rate: Decimal,
    pub charge_amount: Decimal,
    pub vat_amount: Decimal,
    pub narration: Option<String>,
    pub status: TransferStatus,
    pub audit_payload: String,
}

/// Request body for posting a transfer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub debit_account_number: String,
    pub credit_account_number: String,
    pub beneficiary_bank_code: String,
    #[serde(rename = "transactionPIN")]
    pub transaction_pin: String,
    pub debit_bank_name: String,
    pub credit_bank_name: String,
    pub debit_currency: String,
    pub credit_currency: String,
    pub debit_amount: Decimal,
    pub narration: String,
}

impl TransferRequest {
    /// Validate field formats and the narration allow-list. Returns the
    /// joined per-field details on failure.
    pub fn validate(&self) -> Result<(), String> {
        let mut errs = Vec::new();

        if !is_ten_digits(&self.debit_account_number) {
            errs.push("debitAccountNumber must be exactly 10 digits");
        }
        if !is_ten_digits(&self.credit_account_number) {
            errs.push("creditAccountNumber must be exactly 10 digits");
        }

        let bank_code = self.beneficiary_bank_code.trim();
        if bank_code.len() != 6 || !digits_only(bank_code) {
            errs.push("beneficiaryBankCode must be exactly 6 digits");
        }
        if self.transaction_pin.trim().is_empty() {
            errs.push("transactionPIN is required");
        }
        if self.debit_bank_name.trim().is_empty() {
            errs.push("debitBankName is required");
        }
        if self.credit_bank_name.trim().is_empty() {
            errs.push("creditBankName is required");
        }

        if self.debit_currency.trim().len() != 3 {
            errs.push("debitCurrency must be 3 characters");
        }
        if self.credit_currency.trim().len() != 3 {
            errs.push("creditCurrency must be 3 characters");
        }

        if self.debit_amount <= Decimal::ZERO {
            errs.push("debitAmount must be greater than zero");
        }

        if !is_allowed_narration(self.narration.trim()) {
            errs.push("narration is not supported");
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(errs.join("; "))
        }
    }
}

/// Response body for a posted transfer.
///
/// Amount fields are `Option<Decimal>` so the HTTP layer can distinguish
/// "absent" from zero; balance-bearing entities never carry that
/// nullability.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub transaction_reference: String,
    pub external_reference: String,
    pub debit_account_number: String,
    pub credit_account_number: String,
    pub beneficiary_bank_code: String,
    pub debit_currency: String,
    pub credit_currency: String,
    pub debit_amount: Option<Decimal>,
    pub credit_amount: Option<Decimal>,
    pub fcy_rate: Option<Decimal>,
    pub charge_amount: Option<Decimal>,
    #[serde(rename = "vatAmount")]
    pub vat_amount: Option<Decimal>,
    pub sum_total_debit: Option<Decimal>,
    pub narration: String,
    pub status: String,
}

impl TransferResponse {
    /// Map a transfer row plus the total debited (amount + charge + VAT)
    /// into the client-facing shape.
    pub fn from_transfer(transfer: &Transfer, sum_total: Decimal) -> Self {
        Self {
            transaction_reference: transfer.transaction_reference.clone().unwrap_or_default(),
            external_reference: transfer.external_reference.clone().unwrap_or_default(),
            debit_account_number: transfer.debit_account_number.clone(),
            credit_account_number: transfer.credit_account_number.clone().unwrap_or_default(),
            beneficiary_bank_code: transfer.beneficiary_bank_code.clone().unwrap_or_default(),
            debit_currency: transfer.debit_currency.clone(),
            credit_currency: transfer.credit_currency.clone(),
            debit_amount: Some(transfer.debit_amount),
            credit_amount: Some(transfer.credit_amount),
            fcy_rate: Some(transfer.fcy_rate),
            charge_amount: Some(transfer.charge_amount),
            vat_amount: Some(transfer.vat_amount),
            sum_total_debit: Some(sum_total),
            narration: transfer.narration.clone().unwrap_or_default(),
            status: transfer.status.clone(),
        }
    }
}

fn is_allowed_narration(value: &str) -> bool {
    ALLOWED_NARRATIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(value))
}

fn is_ten_digits(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.len() == 10 && digits_only(trimmed)
}

fn digits_only(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_request() -> TransferRequest {
        TransferRequest {
            debit_account_number: "0123456789".into(),
            credit_account_number: "0123456780".into(),
            beneficiary_bank_code: "100100".into(),
            transaction_pin: "1234".into(),
            debit_bank_name: "Grey Bank".into(),
            credit_bank_name: "Grey Bank".into(),
            debit_currency: "USD".into(),
            credit_currency: "USD".into(),
            debit_amount: dec!(50),
            narration: "Salary".into(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn rejects_short_account_number() {
        let mut req = valid_request();
        req.debit_account_number = "12345".into();
        let err = req.validate().unwrap_err();
        assert!(err.contains("debitAccountNumber must be exactly 10 digits"));
    }

    #[test]
    fn rejects_non_numeric_bank_code() {
        let mut req = valid_request();
        req.beneficiary_bank_code = "10A100".into();
        let err = req.validate().unwrap_err();
        assert!(err.contains("beneficiaryBankCode must be exactly 6 digits"));
    }

    #[test]
    fn rejects_zero_amount() {
        let mut req = valid_request();
        req.debit_amount = dec!(0);
        let err = req.validate().unwrap_err();
        assert!(err.contains("debitAmount must be greater than zero"));
    }

    #[test]
    fn narration_allow_list_is_case_insensitive() {
        let mut req = valid_request();
        req.narration = "SALARY".into();
        assert!(req.validate().is_ok());

        req.narration = "loan REPAYMENT".into();
        assert!(req.validate().is_ok());

        req.narration = "gambling".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_request_collects_all_field_errors() {
        let req = TransferRequest {
            debit_account_number: String::new(),
            credit_account_number: String::new(),
            beneficiary_bank_code: String::new(),
            transaction_pin: String::new(),
            debit_bank_name: String::new(),
            credit_bank_name: String::new(),
            debit_currency: String::new(),
            credit_currency: String::new(),
            debit_amount: dec!(0),
            narration: String::new(),
        };
        let err = req.validate().unwrap_err();
        assert!(err.contains("transactionPIN is required"));
        assert!(err.contains("narration is not supported"));
    }
}
