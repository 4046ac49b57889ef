//! Customer identity and transaction-PIN verification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{
    CreateUserRequest, CreateUserResponse, NewUser, PinVerification, User,
};
use crate::stores::UserStore;

/// The PIN-verification capability the posting engine consumes.
#[async_trait]
pub trait PinVerifier: Send + Sync {
    /// `InvalidPin` when the PIN does not match the stored hash;
    /// `UserNotFound` when the customer is unknown.
    async fn verify_pin(
        &self,
        customer_id: &str,
        pin: &str,
    ) -> Result<PinVerification, AppError>;
}

pub struct UserService {
    user_store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(user_store: Arc<dyn UserStore>) -> Self {
        Self { user_store }
    }

    pub async fn create_user(
        &self,
        req: &CreateUserRequest,
    ) -> Result<CreateUserResponse, AppError> {
        req.validate().map_err(AppError::Validation)?;

        let dob = NaiveDate::parse_from_str(req.dob.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Validation("dob must be in YYYY-MM-DD format".to_string()))?;

        let pin = req.transaction_pin.trim().to_string();
        // bcrypt is deliberately slow; keep it off the async worker threads.
        let pin_hash = tokio::task::spawn_blocking(move || bcrypt::hash(pin, bcrypt::DEFAULT_COST))
            .await
            .map_err(|err| AppError::Internal(format!("hash task failed: {err}")))?
            .map_err(|err| AppError::Internal(format!("hash transaction pin: {err}")))?;

        let user = NewUser {
            customer_id: generate_customer_id(),
            first_name: req.first_name.trim().to_string(),
            middle_name: req
                .middle_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            last_name: req.last_name.trim().to_string(),
            dob,
            phone_number: req.phone_number.trim().to_string(),
            id_type: req.id_type.trim().to_string(),
            id_number: req.id_number.trim().to_string(),
            kyc_level: req.kyc_level,
            transaction_pin_hash: pin_hash,
        };

        let created = self.user_store.create(user).await?;
        tracing::info!(customer_id = %created.customer_id, "user created");

        Ok(CreateUserResponse {
            id: created.id,
            customer_id: created.customer_id,
            first_name: created.first_name,
            last_name: created.last_name,
        })
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_store.get_by_id(id).await
    }

    pub async fn get_by_customer_id(&self, customer_id: &str) -> Result<User, AppError> {
        self.user_store.get_by_customer_id(customer_id).await
    }
}

#[async_trait]
impl PinVerifier for UserService {
    async fn verify_pin(
        &self,
        customer_id: &str,
        pin: &str,
    ) -> Result<PinVerification, AppError> {
        let customer_id = customer_id.trim().to_string();
        let pin = pin.trim().to_string();

        if customer_id.is_empty() {
            return Err(AppError::Validation("customerId is required".to_string()));
        }
        if pin.is_empty() {
            return Err(AppError::Validation("pin is required".to_string()));
        }

        let stored_hash = self.user_store.get_pin_hash(&customer_id).await?;

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(pin, &stored_hash))
            .await
            .map_err(|err| AppError::Internal(format!("verify task failed: {err}")))?
            .map_err(|err| AppError::Internal(format!("verify transaction pin: {err}")))?;

        if !matches {
            tracing::info!(customer_id = %customer_id, "transaction pin mismatch");
            return Err(AppError::InvalidPin);
        }

        Ok(PinVerification {
            customer_id,
            is_valid_pin: true,
        })
    }
}

fn generate_customer_id() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or(0);
    format!("{:010}", nanos.rem_euclid(10_000_000_000))
}
