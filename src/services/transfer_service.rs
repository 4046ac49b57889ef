//! The transfer posting engine.
//!
//! Orchestrates a fund transfer end to end: classification (internal vs
//! external), account preloading, PIN verification, FX conversion and fee
//! computation, reference allocation, the atomic posting transaction,
//! journaling, and the fee-settlement sweep. Balance updates are atomic at
//! the database; everything after the posting commit is best-effort and can
//! only leave the transfer at SUCCESS ("settlement pending") instead of
//! CLOSED.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::audit;
use crate::banks;
use crate::error::AppError;
use crate::models::transfer::{
    NewTransfer, Transfer, TransferRequest, TransferResponse, TransferStatus,
};
use crate::models::transient_account::{EntryType, NewLedgerEntry};
use crate::reference;
use crate::response::ApiResponse;
use crate::services::charges_service::ChargesBreakdown;
use crate::services::{ChargesService, PinVerifier, RateService};
use crate::stores::{
    AccountStore, InternalAccountNumbers, LedgerEntryStore, TransferStore, TransientAccountStore,
};

const MSG_SUCCESS: &str = "Transaction successful";
const MSG_SETTLEMENT_PENDING: &str = "Transaction successful. Settlement pending";

/// How many fresh references to try before giving up on a unique-violation
/// streak.
const REFERENCE_ATTEMPTS: usize = 5;

pub struct TransferService {
    transfer_store: Arc<dyn TransferStore>,
    account_store: Arc<dyn AccountStore>,
    transient_account_store: Arc<dyn TransientAccountStore>,
    ledger_entry_store: Arc<dyn LedgerEntryStore>,
    pin_verifier: Arc<dyn PinVerifier>,
    rate_service: Arc<RateService>,
    charges_service: Arc<ChargesService>,
    home_bank_code: String,
    gl_accounts: InternalAccountNumbers,
}

impl TransferService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transfer_store: Arc<dyn TransferStore>,
        account_store: Arc<dyn AccountStore>,
        transient_account_store: Arc<dyn TransientAccountStore>,
        ledger_entry_store: Arc<dyn LedgerEntryStore>,
        pin_verifier: Arc<dyn PinVerifier>,
        rate_service: Arc<RateService>,
        charges_service: Arc<ChargesService>,
        home_bank_code: String,
        gl_accounts: InternalAccountNumbers,
    ) -> Self {
        Self {
            transfer_store,
            account_store,
            transient_account_store,
            ledger_entry_store,
            pin_verifier,
            rate_service,
            charges_service,
            home_bank_code: home_bank_code.trim().to_string(),
            gl_accounts,
        }
    }

    /// Post a transfer. Beneficiary bank codes matching the home bank stay
    /// internal; everything else routes to the external GL for the credit
    /// currency.
    pub async fn transfer_funds(
        &self,
        req: TransferRequest,
    ) -> Result<ApiResponse<TransferResponse>, AppError> {
        tracing::info!(payload = %audit::sanitize_payload(&req), "transfer requested");

        req.validate().map_err(AppError::Validation)?;

        if req.beneficiary_bank_code.trim() == self.home_bank_code {
            self.process_internal(req).await
        } else {
            self.process_external(req).await
        }
    }

    /// Look up a transfer by id, transaction reference, or external
    /// reference (first non-empty wins).
    pub async fn get_transfer(
        &self,
        id: &str,
        transaction_reference: &str,
        external_reference: &str,
    ) -> Result<TransferResponse, AppError> {
        let transfer = self
            .transfer_store
            .get(id, transaction_reference, external_reference)
            .await?;
        let sum_total = transfer.debit_amount + transfer.charge_amount + transfer.vat_amount;
        Ok(TransferResponse::from_transfer(&transfer, sum_total))
    }

    async fn process_internal(
        &self,
        req: TransferRequest,
    ) -> Result<ApiResponse<TransferResponse>, AppError> {
        let debit_account_number = req.debit_account_number.trim().to_string();
        let credit_account_number = req.credit_account_number.trim().to_string();
        if debit_account_number == credit_account_number {
            return Err(AppError::Validation(
                "debitAccountNumber and creditAccountNumber cannot be the same".to_string(),
            ));
        }

        let debit_currency = req.debit_currency.trim().to_uppercase();
        let credit_currency = req.credit_currency.trim().to_uppercase();
        let debit_amount = req.debit_amount;

        // Preload both sides concurrently; each side carries its own
        // not-found discriminator through the join.
        let (debit_account, credit_account) = tokio::try_join!(
            async {
                self.account_store
                    .get_by_account_number(&debit_account_number)
                    .await
                    .map_err(|err| match err {
                        AppError::AccountNotFound => AppError::DebitAccountNotFound,
                        _ => AppError::Internal("failed to fetch debit account".to_string()),
                    })
            },
            async {
                self.account_store
                    .get_by_account_number(&credit_account_number)
                    .await
                    .map_err(|err| match err {
                        AppError::AccountNotFound => AppError::CreditAccountNotFound,
                        _ => AppError::Internal("failed to fetch credit account".to_string()),
                    })
            },
        )?;

        if !debit_account.is_active() {
            return Err(AppError::Validation(
                "debit account is not active".to_string(),
            ));
        }
        if !credit_account.is_active() {
            return Err(AppError::Validation(
                "credit account is not active".to_string(),
            ));
        }
        if !debit_account
            .currency
            .trim()
            .eq_ignore_ascii_case(&debit_currency)
        {
            return Err(AppError::Validation(
                "debit currency does not match debit account currency".to_string(),
            ));
        }
        if !credit_account
            .currency
            .trim()
            .eq_ignore_ascii_case(&credit_currency)
        {
            return Err(AppError::Validation(
                "credit currency does not match credit account currency".to_string(),
            ));
        }

        self.verify_pin(&debit_account.customer_id, &req.transaction_pin)
            .await?;

        // Conversion and fee computation are independent; run both and join
        // at one error barrier.
        let (conversion, charges) = tokio::try_join!(
            self.rate_service
                .convert(debit_amount, &debit_currency, &credit_currency),
            self.charges_service.get_charges(debit_amount, &debit_currency),
        )
        .map_err(|err| AppError::Internal(format!("compute transfer amounts: {err}")))?;

        let credit_amount = conversion.converted_amount;
        let rate_used = conversion.rate_used;
        let ChargesBreakdown {
            charge: charge_amount,
            vat: vat_amount,
            total: sum_total,
            ..
        } = charges;

        let audit_payload = audit::sanitize_payload(&req).to_string();

        let mut transfer = self
            .create_with_reference_retry(|| {
                let transaction_reference = reference::transaction_reference();
                NewTransfer {
                    external_reference: transaction_reference.clone(),
                    transaction_reference,
                    debit_account_number: debit_account_number.clone(),
                    credit_account_number: Some(credit_account_number.clone()),
                    beneficiary_bank_code: Some(req.beneficiary_bank_code.trim().to_string()),
                    debit_bank_name: Some(req.debit_bank_name.trim().to_string()),
                    credit_bank_name: Some(req.credit_bank_name.trim().to_string()),
                    debit_currency: debit_currency.clone(),
                    credit_currency: credit_currency.clone(),
                    debit_amount,
                    credit_amount,
                    fcy_rate: rate_used,
                    charge_amount,
                    vat_amount,
                    narration: Some(req.narration.trim().to_string()),
                    status: TransferStatus::Pending,
                    audit_payload: audit_payload.clone(),
                }
            })
            .await?;

        if let Err(posting_err) = self
            .transfer_store
            .post_internal(
                &debit_account_number,
                sum_total,
                &self.gl_accounts.suspense,
                debit_amount,
                &credit_account_number,
                credit_amount,
            )
            .await
        {
            self.flip_status(&mut transfer, TransferStatus::Failed).await;
            return Err(classify_posting_error(posting_err));
        }

        // Journal the user-facing pair. Best-effort: balances are already
        // authoritative at this point.
        let reference = transfer.transaction_reference.clone().unwrap_or_default();
        tokio::join!(
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.clone(),
                debited_account: debit_account_number.clone(),
                credited_account: self.gl_accounts.suspense.clone(),
                entry_type: EntryType::Credit,
                currency: debit_currency.clone(),
                amount: sum_total,
            }),
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.clone(),
                debited_account: self.gl_accounts.suspense.clone(),
                credited_account: credit_account_number.clone(),
                entry_type: EntryType::Debit,
                currency: credit_currency.clone(),
                amount: credit_amount,
            }),
        );

        self.flip_status(&mut transfer, TransferStatus::Success).await;

        let (charge_usd, vat_usd) = match self
            .convert_fees_to_usd(charge_amount, vat_amount, &debit_currency)
            .await
        {
            Ok(fees) => fees,
            Err(err) => {
                tracing::error!(transfer_id = %transfer.id, error = %err,
                    "fee conversion to USD failed; settlement deferred");
                let response = TransferResponse::from_transfer(&transfer, sum_total);
                return Ok(ApiResponse::success(MSG_SETTLEMENT_PENDING, response));
            }
        };

        if let Err(err) = self
            .settle_and_journal_fees(
                &transfer,
                &reference,
                &debit_currency,
                charge_amount,
                vat_amount,
                charge_usd,
                vat_usd,
            )
            .await
        {
            tracing::error!(transfer_id = %transfer.id, error = %err,
                "fee settlement failed; transfer left at SUCCESS");
            let response = TransferResponse::from_transfer(&transfer, sum_total);
            return Ok(ApiResponse::success(MSG_SETTLEMENT_PENDING, response));
        }

        self.flip_status(&mut transfer, TransferStatus::Closed).await;

        let response = TransferResponse::from_transfer(&transfer, sum_total);
        Ok(ApiResponse::success(MSG_SUCCESS, response))
    }

    async fn process_external(
        &self,
        req: TransferRequest,
    ) -> Result<ApiResponse<TransferResponse>, AppError> {
        let beneficiary_bank_code = req.beneficiary_bank_code.trim().to_string();
        let beneficiary_bank_name = banks::lookup(&beneficiary_bank_code)
            .ok_or_else(|| {
                AppError::Validation("beneficiaryBankCode is not supported".to_string())
            })?
            .to_string();

        let debit_account_number = req.debit_account_number.trim().to_string();
        let credit_account_number = req.credit_account_number.trim().to_string();
        let debit_currency = req.debit_currency.trim().to_uppercase();
        let credit_currency = req.credit_currency.trim().to_uppercase();
        let debit_amount = req.debit_amount;

        let debit_account = self
            .account_store
            .get_by_account_number(&debit_account_number)
            .await
            .map_err(|err| match err {
                AppError::AccountNotFound => AppError::DebitAccountNotFound,
                _ => AppError::Internal("failed to fetch debit account".to_string()),
            })?;

        if !debit_account.is_active() {
            return Err(AppError::Validation(
                "debit account is not active".to_string(),
            ));
        }
        if !debit_account
            .currency
            .trim()
            .eq_ignore_ascii_case(&debit_currency)
        {
            return Err(AppError::Validation(
                "debit currency does not match debit account currency".to_string(),
            ));
        }

        self.verify_pin(&debit_account.customer_id, &req.transaction_pin)
            .await?;

        let conversion = self
            .rate_service
            .convert(debit_amount, &debit_currency, &credit_currency)
            .await
            .map_err(|err| AppError::Internal(format!("convert transfer amount: {err}")))?;
        let credit_amount = conversion.converted_amount;
        let rate_used = conversion.rate_used;

        let charges = self
            .charges_service
            .get_charges(debit_amount, &debit_currency)
            .await
            .map_err(|err| AppError::Internal(format!("compute transfer charges: {err}")))?;
        let ChargesBreakdown {
            charge: charge_amount,
            vat: vat_amount,
            total: sum_total,
            ..
        } = charges;

        // No transfer row exists yet, so a fee-conversion failure here is
        // fatal rather than a deferred settlement.
        let (charge_usd, vat_usd) = self
            .convert_fees_to_usd(charge_amount, vat_amount, &debit_currency)
            .await
            .map_err(|err| AppError::Internal(format!("convert fees to usd: {err}")))?;

        let external_account = self.resolve_external_gl(&credit_currency)?.to_string();

        let audit_payload = audit::sanitize_payload(&req).to_string();

        let mut transfer = self
            .create_with_reference_retry(|| NewTransfer {
                external_reference: reference::external_reference(),
                transaction_reference: reference::transaction_reference(),
                debit_account_number: debit_account_number.clone(),
                credit_account_number: Some(credit_account_number.clone()),
                beneficiary_bank_code: Some(beneficiary_bank_code.clone()),
                debit_bank_name: Some(req.debit_bank_name.trim().to_string()),
                credit_bank_name: Some(beneficiary_bank_name.clone()),
                debit_currency: debit_currency.clone(),
                credit_currency: credit_currency.clone(),
                debit_amount,
                credit_amount,
                fcy_rate: rate_used,
                charge_amount,
                vat_amount,
                narration: Some(req.narration.trim().to_string()),
                status: TransferStatus::Pending,
                audit_payload: audit_payload.clone(),
            })
            .await?;

        if let Err(posting_err) = self
            .transfer_store
            .post_external(
                &debit_account_number,
                sum_total,
                &self.gl_accounts.suspense,
                credit_amount,
                &external_account,
                &credit_currency,
            )
            .await
        {
            self.flip_status(&mut transfer, TransferStatus::Failed).await;
            return Err(classify_posting_error(posting_err));
        }

        let reference = transfer.external_reference.clone().unwrap_or_default();
        tokio::join!(
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.clone(),
                debited_account: debit_account_number.clone(),
                credited_account: self.gl_accounts.suspense.clone(),
                entry_type: EntryType::Credit,
                currency: debit_currency.clone(),
                amount: sum_total,
            }),
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.clone(),
                debited_account: self.gl_accounts.suspense.clone(),
                credited_account: external_account.clone(),
                entry_type: EntryType::Debit,
                currency: credit_currency.clone(),
                amount: credit_amount,
            }),
        );

        self.flip_status(&mut transfer, TransferStatus::Success).await;

        if let Err(err) = self
            .settle_and_journal_fees(
                &transfer,
                &reference,
                &debit_currency,
                charge_amount,
                vat_amount,
                charge_usd,
                vat_usd,
            )
            .await
        {
            tracing::error!(transfer_id = %transfer.id, error = %err,
                "external fee settlement failed; transfer left at SUCCESS");
            let response = TransferResponse::from_transfer(&transfer, sum_total);
            return Ok(ApiResponse::success(MSG_SETTLEMENT_PENDING, response));
        }

        self.flip_status(&mut transfer, TransferStatus::Closed).await;

        let response = TransferResponse::from_transfer(&transfer, sum_total);
        Ok(ApiResponse::success(MSG_SUCCESS, response))
    }

    /// Consult the user service about the transaction PIN. An explicit
    /// mismatch is a validation failure; anything else that goes wrong is
    /// internal.
    async fn verify_pin(&self, customer_id: &str, pin: &str) -> Result<(), AppError> {
        match self.pin_verifier.verify_pin(customer_id, pin.trim()).await {
            Ok(verification) if verification.is_valid_pin => Ok(()),
            Ok(_) | Err(AppError::InvalidPin) => Err(AppError::Validation(
                "invalid transactionPIN".to_string(),
            )),
            Err(err) => {
                tracing::error!(error = %err, "pin verification failed");
                Err(AppError::Internal(
                    "unable to verify transaction pin".to_string(),
                ))
            }
        }
    }

    /// Insert the transfer row, regenerating references on unique
    /// violations for up to [`REFERENCE_ATTEMPTS`] tries.
    async fn create_with_reference_retry(
        &self,
        mut build: impl FnMut() -> NewTransfer,
    ) -> Result<Transfer, AppError> {
        for _ in 0..REFERENCE_ATTEMPTS {
            match self.transfer_store.create(build()).await {
                Ok(transfer) => return Ok(transfer),
                Err(err) if err.is_duplicate_reference() => continue,
                Err(err) => {
                    return Err(AppError::Internal(format!("create transfer: {err}")));
                }
            }
        }
        Err(AppError::Internal(
            "exhausted transfer reference attempts".to_string(),
        ))
    }

    /// Express the fees in USD for settlement. Same-currency transfers pass
    /// through unchanged.
    async fn convert_fees_to_usd(
        &self,
        charge: Decimal,
        vat: Decimal,
        debit_currency: &str,
    ) -> Result<(Decimal, Decimal), AppError> {
        if debit_currency.eq_ignore_ascii_case("USD") {
            return Ok((charge, vat));
        }

        let rate = self.rate_service.get_one(debit_currency, "USD").await?;
        if rate.rate <= Decimal::ZERO {
            return Err(AppError::InvalidRate);
        }

        Ok((charge * rate.rate, vat * rate.rate))
    }

    /// Sweep the fees from the suspense to the USD fee GLs and journal the
    /// four settlement legs.
    #[allow(clippy::too_many_arguments)]
    async fn settle_and_journal_fees(
        &self,
        transfer: &Transfer,
        reference: &str,
        debit_currency: &str,
        charge_amount: Decimal,
        vat_amount: Decimal,
        charge_usd: Decimal,
        vat_usd: Decimal,
    ) -> Result<(), AppError> {
        self.transient_account_store
            .settle_fees_to_usd(
                &self.gl_accounts.suspense,
                charge_amount,
                vat_amount,
                &self.gl_accounts.charges,
                &self.gl_accounts.vat,
                charge_usd,
                vat_usd,
            )
            .await?;

        // Two legs record the source-currency sweep out of the suspense,
        // two record the USD arrival on the fee accounts.
        tokio::join!(
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.to_string(),
                debited_account: self.gl_accounts.suspense.clone(),
                credited_account: self.gl_accounts.charges.clone(),
                entry_type: EntryType::Debit,
                currency: debit_currency.to_string(),
                amount: charge_amount,
            }),
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.to_string(),
                debited_account: self.gl_accounts.suspense.clone(),
                credited_account: self.gl_accounts.vat.clone(),
                entry_type: EntryType::Debit,
                currency: debit_currency.to_string(),
                amount: vat_amount,
            }),
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.to_string(),
                debited_account: self.gl_accounts.suspense.clone(),
                credited_account: self.gl_accounts.charges.clone(),
                entry_type: EntryType::Credit,
                currency: "USD".to_string(),
                amount: charge_usd,
            }),
            self.journal(NewLedgerEntry {
                transfer_id: transfer.id,
                external_reference: reference.to_string(),
                debited_account: self.gl_accounts.suspense.clone(),
                credited_account: self.gl_accounts.vat.clone(),
                entry_type: EntryType::Credit,
                currency: "USD".to_string(),
                amount: vat_usd,
            }),
        );

        Ok(())
    }

    /// Append one journal row, swallowing failures - the ledger is advisory
    /// once balances have committed.
    async fn journal(&self, entry: NewLedgerEntry) {
        if let Err(err) = self.ledger_entry_store.append(entry).await {
            tracing::warn!(error = %err, "ledger entry append failed");
        }
    }

    /// Apply a status transition, keeping the local copy in sync. Update
    /// failures are logged and swallowed: the caller's state repair path is
    /// the same `update_status` again.
    async fn flip_status(&self, transfer: &mut Transfer, status: TransferStatus) {
        if let Err(err) = self.transfer_store.update_status(transfer.id, status).await {
            tracing::warn!(transfer_id = %transfer.id, status = status.as_str(), error = %err,
                "transfer status update failed");
        }
        transfer.status = status.as_str().to_string();
    }

    fn resolve_external_gl(&self, credit_currency: &str) -> Result<&str, AppError> {
        match credit_currency.trim().to_uppercase().as_str() {
            "USD" => Ok(&self.gl_accounts.usd_gl),
            "GBP" => Ok(&self.gl_accounts.gbp_gl),
            "EUR" => Ok(&self.gl_accounts.eur_gl),
            "NGN" => Ok(&self.gl_accounts.ngn_gl),
            _ => Err(AppError::Validation(
                "unsupported credit currency".to_string(),
            )),
        }
    }
}

/// The posting transaction reports every zero-rows abort through one generic
/// signal whose text names all three possible causes; classification is by
/// substring, so those aborts surface as insufficient balance and only
/// transport-level failures fall through.
fn classify_posting_error(err: AppError) -> AppError {
    match &err {
        AppError::Internal(msg) if msg.to_lowercase().contains("insufficient balance") => {
            AppError::InsufficientBalance
        }
        _ => AppError::Internal(format!("posting aborted: {err}")),
    }
}
