//! Account opening, lookup, and deposits.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::banks;
use crate::error::AppError;
use crate::models::account::{
    Account, AccountResponse, AccountStatus, CreateAccountRequest, DepositRequest, NewAccount,
};
use crate::stores::{AccountStore, UserStore};

/// Name-enquiry style lookup result. Internal accounts carry balances;
/// participant-bank accounts resolve to a stubbed holder name since real
/// interbank enquiry is out of scope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLookup {
    pub account_number: String,
    pub account_name: String,
    pub bank_code: String,
    pub bank_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountResponse>,
}

pub struct AccountService {
    account_store: Arc<dyn AccountStore>,
    user_store: Arc<dyn UserStore>,
    home_bank_code: String,
}

impl AccountService {
    pub fn new(
        account_store: Arc<dyn AccountStore>,
        user_store: Arc<dyn UserStore>,
        home_bank_code: String,
    ) -> Self {
        Self {
            account_store,
            user_store,
            home_bank_code: home_bank_code.trim().to_string(),
        }
    }

    /// Open an account for an existing customer. A customer may hold at
    /// most one account per currency.
    pub async fn create_account(
        &self,
        req: &CreateAccountRequest,
    ) -> Result<AccountResponse, AppError> {
        req.validate().map_err(AppError::Validation)?;

        let customer_id = req.customer_id.trim().to_string();
        let currency = req.currency.trim().to_uppercase();

        self.user_store
            .get_by_customer_id(&customer_id)
            .await
            .map_err(|err| match err {
                AppError::UserNotFound => {
                    AppError::Validation("customer does not exist".to_string())
                }
                other => other,
            })?;

        if self
            .account_store
            .exists_for_customer(&customer_id, &currency)
            .await?
        {
            return Err(AppError::Validation(
                "customer already has an account in this currency".to_string(),
            ));
        }

        let balance = req.initial_deposit.unwrap_or(Decimal::ZERO);
        let account = NewAccount {
            customer_id,
            account_number: generate_account_number(),
            currency,
            available_balance: balance,
            ledger_balance: balance,
            status: AccountStatus::Active,
        };

        let created = self.account_store.create(account).await?;
        tracing::info!(
            account_number = %created.account_number,
            customer_id = %created.customer_id,
            "account opened"
        );
        Ok(created.into())
    }

    /// Look up an account by number and bank code. Home-bank accounts come
    /// from the accounts table; participant-bank codes resolve through the
    /// registry.
    pub async fn get_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<AccountLookup, AppError> {
        let account_number = account_number.trim();
        let bank_code = bank_code.trim();

        if !is_ten_digits(account_number) {
            return Err(AppError::Validation(
                "accountNumber must be exactly 10 digits".to_string(),
            ));
        }
        if bank_code.len() != 6 || !bank_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "bankCode must be exactly 6 digits".to_string(),
            ));
        }

        if bank_code != self.home_bank_code {
            let bank_name = banks::lookup(bank_code).ok_or_else(|| {
                AppError::Validation("bankCode is not supported".to_string())
            })?;
            return Ok(AccountLookup {
                account_number: account_number.to_string(),
                account_name: "John III Party".to_string(),
                bank_code: bank_code.to_string(),
                bank_name: bank_name.to_string(),
                account: None,
            });
        }

        let account = self
            .account_store
            .get_by_account_number(account_number)
            .await?;
        Ok(AccountLookup {
            account_number: account.account_number.clone(),
            account_name: account.customer_id.clone(),
            bank_code: bank_code.to_string(),
            bank_name: "Grey".to_string(),
            account: Some(account.into()),
        })
    }

    /// Deposit funds into an active account and return its new balances.
    pub async fn deposit_funds(&self, req: &DepositRequest) -> Result<AccountResponse, AppError> {
        let account_number = req.account_number.trim();
        if !is_ten_digits(account_number) {
            return Err(AppError::Validation(
                "accountNumber must be exactly 10 digits".to_string(),
            ));
        }
        if req.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        self.account_store.deposit(account_number, req.amount).await?;

        let account: Account = self
            .account_store
            .get_by_account_number(account_number)
            .await?;
        Ok(account.into())
    }
}

fn generate_account_number() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or(0);
    format!("{:010}", nanos.rem_euclid(10_000_000_000))
}

fn is_ten_digits(value: &str) -> bool {
    value.len() == 10 && value.chars().all(|c| c.is_ascii_digit())
}
