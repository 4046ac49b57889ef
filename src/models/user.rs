//! Customer identity models. The posting core only consumes PIN
//! verification and customer lookup; creation exists so accounts have an
//! owner to attach to.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ID_TYPE_PASSPORT: &str = "Passport";
pub const ID_TYPE_DL: &str = "DL";

/// Represents a user record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub customer_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub dob: NaiveDate,
    pub phone_number: String,
    pub id_type: String,
    pub id_number: String,
    pub kyc_level: i32,
    pub transaction_pin_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new user row. The store populates id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub customer_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub dob: NaiveDate,
    pub phone_number: String,
    pub id_type: String,
    pub id_number: String,
    pub kyc_level: i32,
    pub transaction_pin_hash: String,
}

/// Request body for creating a user.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    /// YYYY-MM-DD
    pub dob: String,
    pub phone_number: String,
    pub id_type: String,
    pub id_number: String,
    pub kyc_level: i32,
    pub transaction_pin: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        let mut errs = Vec::new();

        if self.first_name.trim().is_empty() {
            errs.push("firstName is required");
        }
        if self.last_name.trim().is_empty() {
            errs.push("lastName is required");
        }
        if self.dob.trim().is_empty() {
            errs.push("dob is required");
        } else if NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d").is_err() {
            errs.push("dob must be in YYYY-MM-DD format");
        }
        if self.phone_number.trim().is_empty() {
            errs.push("phoneNumber is required");
        }
        let id_type = self.id_type.trim();
        if id_type.is_empty() {
            errs.push("idType is required");
        } else if id_type != ID_TYPE_PASSPORT && id_type != ID_TYPE_DL {
            errs.push("idType must be Passport or DL");
        }
        if self.id_number.trim().is_empty() {
            errs.push("idNumber is required");
        }
        if self.kyc_level <= 0 {
            errs.push("kycLevel must be greater than zero");
        }
        if self.transaction_pin.trim().is_empty() {
            errs.push("transactionPin is required");
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(errs.join("; "))
        }
    }
}

/// Response body for user creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub id: Uuid,
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
}

/// Response body for user lookups. The PIN hash never leaves the service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub customer_id: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub dob: NaiveDate,
    pub phone_number: String,
    pub id_type: String,
    pub id_number: String,
    pub kyc_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            customer_id: user.customer_id,
            first_name: user.first_name,
            middle_name: user.middle_name,
            last_name: user.last_name,
            dob: user.dob,
            phone_number: user.phone_number,
            id_type: user.id_type,
            id_number: user.id_number,
            kyc_level: user.kyc_level,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request body for verifying a transaction PIN.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinRequest {
    pub customer_id: String,
    pub pin: String,
}

/// Outcome of a PIN verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinVerification {
    pub customer_id: String,
    pub is_valid_pin: bool,
}
