//! HTTP handlers. Thin by design: deserialize, call a service, wrap the
//! result in the response envelope.

pub mod accounts;
pub mod banks;
pub mod charges;
pub mod health;
pub mod rates;
pub mod transfers;
pub mod users;

use std::sync::Arc;

use crate::services::{AccountService, ChargesService, RateService, TransferService, UserService};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub user_service: Arc<UserService>,
    pub rate_service: Arc<RateService>,
    pub charges_service: Arc<ChargesService>,
    pub transfer_service: Arc<TransferService>,
}
