//! In-memory store doubles for service tests.
//!
//! `MemoryBank` implements the account, transient-account, ledger, and
//! transfer store traits over one shared state so the posting engine can be
//! exercised end to end without a database. Failure knobs simulate the
//! scenarios the real stores produce: reference collisions and settlement
//! aborts.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::{Account, AccountStatus, NewAccount};
use crate::models::rate::Rate;
use crate::models::transfer::{NewTransfer, Transfer, TransferStatus};
use crate::models::transient_account::{LedgerEntry, NewLedgerEntry};
use crate::models::user::PinVerification;
use crate::services::PinVerifier;
use crate::stores::transfers::POSTING_FAILED;
use crate::stores::{
    AccountStore, InternalAccountNumbers, LedgerEntryStore, RateStore, TransferStore,
    TransientAccountStore,
};

/// Rate store double backed by a fixed pair table.
pub struct MockRateStore {
    rates: Vec<Rate>,
}

impl MockRateStore {
    pub fn empty() -> Self {
        Self { rates: Vec::new() }
    }

    pub fn with_pairs(pairs: &[(&str, &str, Decimal)]) -> Self {
        let now = Utc::now();
        let rates = pairs
            .iter()
            .enumerate()
            .map(|(idx, (from, to, rate))| Rate {
                id: idx as i64 + 1,
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate: *rate,
                rate_date: now.date_naive(),
                created_at: now,
            })
            .collect();
        Self { rates }
    }
}

#[async_trait]
impl RateStore for MockRateStore {
    async fn seed_defaults(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Rate>, AppError> {
        Ok(self.rates.clone())
    }

    async fn lookup(&self, from_currency: &str, to_currency: &str) -> Result<Rate, AppError> {
        self.rates
            .iter()
            .find(|rate| {
                rate.from_currency.eq_ignore_ascii_case(from_currency)
                    && rate.to_currency.eq_ignore_ascii_case(to_currency)
            })
            .cloned()
            .ok_or(AppError::RateNotFound)
    }
}

/// PIN verifier double.
pub enum PinBehavior {
    Valid,
    /// The stored hash does not match.
    Mismatch,
    /// Verification succeeds but reports the PIN as invalid.
    FlaggedInvalid,
    /// The verifier itself fails.
    Unavailable,
}

pub struct MockPinVerifier {
    behavior: PinBehavior,
}

impl MockPinVerifier {
    pub fn new(behavior: PinBehavior) -> Self {
        Self { behavior }
    }
}

#[async_trait]
impl PinVerifier for MockPinVerifier {
    async fn verify_pin(
        &self,
        customer_id: &str,
        _pin: &str,
    ) -> Result<PinVerification, AppError> {
        match self.behavior {
            PinBehavior::Valid => Ok(PinVerification {
                customer_id: customer_id.to_string(),
                is_valid_pin: true,
            }),
            PinBehavior::Mismatch => Err(AppError::InvalidPin),
            PinBehavior::FlaggedInvalid => Ok(PinVerification {
                customer_id: customer_id.to_string(),
                is_valid_pin: false,
            }),
            PinBehavior::Unavailable => {
                Err(AppError::Internal("pin service unavailable".to_string()))
            }
        }
    }
}

#[derive(Default)]
struct BankState {
    accounts: HashMap<String, Account>,
    /// account number -> (currency, balance)
    transients: HashMap<String, (String, Decimal)>,
    transfers: HashMap<Uuid, Transfer>,
    entries: Vec<LedgerEntry>,
    attempted_references: Vec<String>,
}

/// One shared in-memory bank implementing every store the posting engine
/// consumes. Clone the `Arc` into each trait slot.
#[derive(Default)]
pub struct MemoryBank {
    state: Mutex<BankState>,
    /// Number of initial `TransferStore::create` calls to reject with a
    /// unique violation.
    duplicate_creates: AtomicUsize,
    fail_settlement: AtomicBool,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_first_creates(&self, count: usize) {
        self.duplicate_creates.store(count, Ordering::SeqCst);
    }

    pub fn fail_settlement(&self) {
        self.fail_settlement.store(true, Ordering::SeqCst);
    }

    pub fn add_account(
        &self,
        account_number: &str,
        customer_id: &str,
        currency: &str,
        balance: Decimal,
        status: AccountStatus,
    ) {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            customer_id: customer_id.to_string(),
            account_number: account_number.to_string(),
            currency: currency.to_string(),
            available_balance: balance,
            ledger_balance: balance,
            status: status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(account_number.to_string(), account);
    }

    pub fn add_transient(&self, account_number: &str, currency: &str, balance: Decimal) {
        self.state
            .lock()
            .unwrap()
            .transients
            .insert(account_number.to_string(), (currency.to_string(), balance));
    }

    pub fn account_balance(&self, account_number: &str) -> Decimal {
        self.state.lock().unwrap().accounts[account_number].available_balance
    }

    pub fn transient_balance(&self, account_number: &str) -> Decimal {
        self.state.lock().unwrap().transients[account_number].1
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.state.lock().unwrap().transfers.values().cloned().collect()
    }

    pub fn entry_count(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn attempted_references(&self) -> Vec<String> {
        self.state.lock().unwrap().attempted_references.clone()
    }
}

#[async_trait]
impl AccountStore for MemoryBank {
    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            customer_id: account.customer_id,
            account_number: account.account_number.clone(),
            currency: account.currency,
            available_balance: account.available_balance,
            ledger_balance: account.ledger_balance,
            status: account.status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(account.account_number, created.clone());
        Ok(created)
    }

    async fn get_by_account_number(&self, account_number: &str) -> Result<Account, AppError> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(account_number)
            .cloned()
            .ok_or(AppError::AccountNotFound)
    }

    async fn exists_for_customer(
        &self,
        customer_id: &str,
        currency: &str,
    ) -> Result<bool, AppError> {
        Ok(self.state.lock().unwrap().accounts.values().any(|acct| {
            acct.customer_id == customer_id && acct.currency.eq_ignore_ascii_case(currency)
        }))
    }

    async fn deposit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(account_number)
            .ok_or(AppError::AccountNotFound)?;
        if account.status != AccountStatus::Active.as_str() {
            return Err(AppError::Validation("account is not active".to_string()));
        }
        account.available_balance += amount;
        account.ledger_balance += amount;
        Ok(())
    }

    async fn debit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(account_number)
            .ok_or(AppError::AccountNotFound)?;
        if account.status != AccountStatus::Active.as_str() {
            return Err(AppError::Validation("account is not active".to_string()));
        }
        if account.available_balance < amount {
            return Err(AppError::InsufficientBalance);
        }
        account.available_balance -= amount;
        account.ledger_balance -= amount;
        Ok(())
    }

    async fn credit(&self, account_number: &str, amount: Decimal) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(account_number)
            .ok_or(AppError::AccountNotFound)?;
        if account.status != AccountStatus::Active.as_str() {
            return Err(AppError::Validation("account is not active".to_string()));
        }
        account.available_balance += amount;
        account.ledger_balance += amount;
        Ok(())
    }
}

#[async_trait]
impl TransientAccountStore for MemoryBank {
    async fn ensure_internal(&self, numbers: &InternalAccountNumbers) -> Result<(), AppError> {
        for (number, currency) in [
            (&numbers.suspense, "MCY"),
            (&numbers.charges, "USD"),
            (&numbers.vat, "USD"),
            (&numbers.usd_gl, "USD"),
            (&numbers.gbp_gl, "GBP"),
            (&numbers.eur_gl, "EUR"),
            (&numbers.ngn_gl, "NGN"),
        ] {
            self.state
                .lock()
                .unwrap()
                .transients
                .entry(number.clone())
                .or_insert((currency.to_string(), Decimal::ZERO));
        }
        Ok(())
    }

    async fn credit(
        &self,
        account_number: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        match state.transients.get_mut(account_number) {
            Some((ccy, balance)) if ccy.eq_ignore_ascii_case(currency) => {
                *balance += amount;
                Ok(())
            }
            _ => Err(AppError::AccountNotFound),
        }
    }

    async fn debit(
        &self,
        account_number: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        match state.transients.get_mut(account_number) {
            Some((ccy, balance)) if ccy.eq_ignore_ascii_case(currency) => {
                if *balance < amount {
                    return Err(AppError::InsufficientBalance);
                }
                *balance -= amount;
                Ok(())
            }
            _ => Err(AppError::AccountNotFound),
        }
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
        if self.fail_settlement.load(Ordering::SeqCst) {
            return Err(AppError::Internal("settlement unavailable".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let fees = charge_src + vat_src;
        {
            let (_, balance) = state
                .transients
                .get(suspense_account)
                .ok_or(AppError::AccountNotFound)?;
            if *balance < fees {
                return Err(AppError::InsufficientBalance);
            }
        }
        for account in [charges_account, vat_account] {
            match state.transients.get(account) {
                Some((ccy, _)) if ccy.eq_ignore_ascii_case("USD") => {}
                _ => return Err(AppError::AccountNotFound),
            }
        }

        state.transients.get_mut(suspense_account).unwrap().1 -= fees;
        state.transients.get_mut(charges_account).unwrap().1 += charge_usd;
        state.transients.get_mut(vat_account).unwrap().1 += vat_usd;
        Ok(())
    }
}

#[async_trait]
impl LedgerEntryStore for MemoryBank {
    async fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, AppError> {
        let stored = LedgerEntry {
            id: Uuid::new_v4(),
            transfer_id: entry.transfer_id,
            external_reference: entry.external_reference,
            debited_account: entry.debited_account,
            credited_account: entry.credited_account,
            entry_type: entry.entry_type.as_str().to_string(),
            currency: entry.currency,
            amount: entry.amount,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().entries.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl TransferStore for MemoryBank {
    async fn create(&self, transfer: NewTransfer) -> Result<Transfer, AppError> {
        {
            let mut state = self.state.lock().unwrap();
            state
                .attempted_references
                .push(transfer.transaction_reference.clone());
        }

        let remaining = self.duplicate_creates.load(Ordering::SeqCst);
        if remaining > 0 {
            self.duplicate_creates.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::DuplicateReference);
        }

        let now = Utc::now();
        let stored = Transfer {
            id: Uuid::new_v4(),
            external_reference: Some(transfer.external_reference),
            transaction_reference: Some(transfer.transaction_reference),
            debit_account_number: transfer.debit_account_number,
            credit_account_number: transfer.credit_account_number,
            beneficiary_bank_code: transfer.beneficiary_bank_code,
            debit_bank_name: transfer.debit_bank_name,
            credit_bank_name: transfer.credit_bank_name,
            debit_currency: transfer.debit_currency,
            credit_currency: transfer.credit_currency,
            debit_amount: transfer.debit_amount,
            credit_amount: transfer.credit_amount,
            fcy_rate: transfer.fcy_rate,
            charge_amount: transfer.charge_amount,
            vat_amount: transfer.vat_amount,
            narration: transfer.narration,
            status: transfer.status.as_str().to_string(),
            audit_payload: transfer.audit_payload,
            created_at: now,
            updated_at: now,
            processed_at: None,
        };
        self.state
            .lock()
            .unwrap()
            .transfers
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, transfer: &Transfer) -> Result<Transfer, AppError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .transfers
            .get_mut(&transfer.id)
            .ok_or(AppError::AccountNotFound)?;
        *stored = transfer.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn update_status(&self, id: Uuid, status: TransferStatus) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let transfer = state
            .transfers
            .get_mut(&id)
            .ok_or_else(|| AppError::Internal(format!("transfer {id} not found")))?;
        transfer.status = status.as_str().to_string();
        transfer.updated_at = Utc::now();
        if matches!(
            status,
            TransferStatus::Success | TransferStatus::Failed | TransferStatus::Closed
        ) {
            transfer.processed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn get(
        &self,
        id: &str,
        transaction_reference: &str,
        external_reference: &str,
    ) -> Result<Transfer, AppError> {
        let state = self.state.lock().unwrap();
        state
            .transfers
            .values()
            .find(|transfer| {
                (!id.is_empty() && transfer.id.to_string() == id)
                    || (!transaction_reference.is_empty()
                        && transfer.transaction_reference.as_deref()
                            == Some(transaction_reference))
                    || (!external_reference.is_empty()
                        && transfer.external_reference.as_deref() == Some(external_reference))
            })
            .cloned()
            .ok_or(AppError::AccountNotFound)
    }

    async fn post_internal(
        &self,
        debit_account: &str,
        total: Decimal,
        suspense_account: &str,
        suspense_amount: Decimal,
        credit_account: &str,
        credit_amount: Decimal,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let posting_failed = || AppError::Internal(POSTING_FAILED.to_string());

        // Check every guard before mutating anything - the real store runs
        // all four statements in one rolled-back-on-failure transaction.
        match state.accounts.get(debit_account) {
            Some(acct)
                if acct.status == AccountStatus::Active.as_str()
                    && acct.available_balance >= total => {}
            _ => return Err(posting_failed()),
        }
        if !state.transients.contains_key(suspense_account) {
            return Err(posting_failed());
        }
        match state.accounts.get(credit_account) {
            Some(acct) if acct.status == AccountStatus::Active.as_str() => {}
            _ => return Err(posting_failed()),
        }

        {
            let debit = state.accounts.get_mut(debit_account).unwrap();
            debit.available_balance -= total;
            debit.ledger_balance -= total;
        }
        {
            let suspense = state.transients.get_mut(suspense_account).unwrap();
            suspense.1 += suspense_amount;
            if suspense.1 < suspense_amount {
                return Err(posting_failed());
            }
            suspense.1 -= suspense_amount;
        }
        {
            let credit = state.accounts.get_mut(credit_account).unwrap();
            credit.available_balance += credit_amount;
            credit.ledger_balance += credit_amount;
        }
        Ok(())
    }

    async fn post_external(
        &self,
        debit_account: &str,
        total: Decimal,
        suspense_account: &str,
        beneficiary_amount: Decimal,
        external_account: &str,
        external_currency: &str,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let posting_failed = || AppError::Internal(POSTING_FAILED.to_string());

        match state.accounts.get(debit_account) {
            Some(acct)
                if acct.status == AccountStatus::Active.as_str()
                    && acct.available_balance >= total => {}
            _ => return Err(posting_failed()),
        }
        match state.transients.get(suspense_account) {
            Some((_, balance)) if *balance + total >= beneficiary_amount => {}
            _ => return Err(posting_failed()),
        }
        match state.transients.get(external_account) {
            Some((ccy, _)) if ccy.eq_ignore_ascii_case(external_currency) => {}
            _ => return Err(posting_failed()),
        }

        {
            let debit = state.accounts.get_mut(debit_account).unwrap();
            debit.available_balance -= total;
            debit.ledger_balance -= total;
        }
        {
            let suspense = state.transients.get_mut(suspense_account).unwrap();
            suspense.1 += total;
            suspense.1 -= beneficiary_amount;
        }
        state.transients.get_mut(external_account).unwrap().1 += beneficiary_amount;
        Ok(())
    }
}
