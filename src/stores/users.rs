//! Postgres-backed user store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::user::{NewUser, User};
use crate::stores::UserStore;

pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                customer_id, first_name, middle_name, last_name, dob,
                phone_number, id_type, id_number, kyc_level,
                transaction_pin_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&user.customer_id)
        .bind(&user.first_name)
        .bind(&user.middle_name)
        .bind(&user.last_name)
        .bind(user.dob)
        .bind(&user.phone_number)
        .bind(&user.id_type)
        .bind(&user.id_number)
        .bind(user.kyc_level)
        .bind(&user.transaction_pin_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(customer_id = %created.customer_id, "user created");
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    async fn get_by_customer_id(&self, customer_id: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    async fn get_pin_hash(&self, customer_id: &str) -> Result<String, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT transaction_pin_hash FROM users WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::UserNotFound)
    }
}
