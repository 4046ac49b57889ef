//! Payment posting service - main application entry point.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Seed the well-known GL rows and the default FX rates
//! 4. Build the store and service graph
//! 5. Start the HTTP server

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use payment_posting_service::config::Config;
use payment_posting_service::handlers::{self, AppState};
use payment_posting_service::services::{
    AccountService, ChargesService, RateService, TransferService, UserService,
};
use payment_posting_service::stores::{
    InternalAccountNumbers, PgAccountStore, PgLedgerEntryStore, PgRateStore, PgTransferStore,
    PgTransientAccountStore, PgUserStore, RateStore, TransientAccountStore,
};
use payment_posting_service::{db, stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaults to "info" level.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("database migrations complete");

    let gl_accounts = InternalAccountNumbers {
        suspense: config.suspense_account_number.clone(),
        charges: config.charges_account_number.clone(),
        vat: config.vat_account_number.clone(),
        usd_gl: config.external_usd_gl_account_number.clone(),
        gbp_gl: config.external_gbp_gl_account_number.clone(),
        eur_gl: config.external_eur_gl_account_number.clone(),
        ngn_gl: config.external_ngn_gl_account_number.clone(),
    };

    let account_store: Arc<dyn stores::AccountStore> =
        Arc::new(PgAccountStore::new(pool.clone()));
    let transient_account_store: Arc<dyn TransientAccountStore> =
        Arc::new(PgTransientAccountStore::new(pool.clone()));
    let ledger_entry_store: Arc<dyn stores::LedgerEntryStore> =
        Arc::new(PgLedgerEntryStore::new(pool.clone()));
    let transfer_store: Arc<dyn stores::TransferStore> =
        Arc::new(PgTransferStore::new(pool.clone()));
    let rate_store: Arc<dyn RateStore> = Arc::new(PgRateStore::new(pool.clone()));
    let user_store: Arc<dyn stores::UserStore> = Arc::new(PgUserStore::new(pool.clone()));

    // The GL rows and default rates must exist before the first posting.
    transient_account_store.ensure_internal(&gl_accounts).await?;
    rate_store.seed_defaults().await?;

    let user_service = Arc::new(UserService::new(user_store.clone()));
    let account_service = Arc::new(AccountService::new(
        account_store.clone(),
        user_store,
        config.home_bank_code.clone(),
    ));
    let rate_service = Arc::new(RateService::new(rate_store.clone()));
    let charges_service = Arc::new(ChargesService::new(
        rate_store,
        config.charge_percent,
        config.vat_percent,
        config.charge_min,
        config.charge_max,
    ));
    let transfer_service = Arc::new(TransferService::new(
        transfer_store,
        account_store,
        transient_account_store,
        ledger_entry_store,
        user_service.clone(),
        rate_service.clone(),
        charges_service.clone(),
        config.home_bank_code.clone(),
        gl_accounts,
    ));

    let state = AppState {
        account_service,
        user_service,
        rate_service,
        charges_service,
        transfer_service,
    };

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/users", post(handlers::users::create_user))
        .route("/api/v1/users/{id}", get(handlers::users::get_user))
        .route(
            "/api/v1/users/verify-pin",
            post(handlers::users::verify_pin),
        )
        .route("/api/v1/accounts", post(handlers::accounts::create_account))
        .route(
            "/api/v1/accounts/deposit",
            post(handlers::accounts::deposit_funds),
        )
        .route(
            "/api/v1/accounts/{account_number}",
            get(handlers::accounts::get_account),
        )
        .route("/api/v1/rates", get(handlers::rates::list_rates))
        .route("/api/v1/rates/convert", post(handlers::rates::convert_rate))
        .route("/api/v1/rates/{from}/{to}", get(handlers::rates::get_rate))
        .route("/api/v1/charges", post(handlers::charges::get_charges))
        .route("/api/v1/banks", get(handlers::banks::list_banks))
        .route(
            "/api/v1/transfers",
            post(handlers::transfers::create_transfer).get(handlers::transfers::get_transfer),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
