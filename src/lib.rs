//! Multi-currency payment posting service.
//!
//! Accepts customer fund-transfer requests and atomically updates a
//! double-entry ledger of customer accounts, an internal suspense account,
//! fee accounts, and external GL accounts. Intra-bank transfers debit and
//! credit internal customers; cross-bank transfers debit an internal
//! customer and credit an external GL for later bilateral settlement. FX
//! conversion, per-transaction charges, and VAT are applied on the way
//! through.
//!
//! # Architecture
//!
//! - **Web framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries, compile-time
//!   migrations)
//! - **Money**: `rust_decimal` everywhere - no floats touch a balance
//! - **Concurrency**: bounded per-request fan-out with `tokio::try_join!`;
//!   all mutual exclusion comes from row-level locks inside guarded UPDATEs

pub mod audit;
pub mod banks;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod reference;
pub mod response;
pub mod services;
pub mod stores;
