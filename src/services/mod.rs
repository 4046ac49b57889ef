//! Business logic. Services depend on the store traits, never on the pool
//! directly, so every path can run against in-memory doubles.

pub mod account_service;
pub mod charges_service;
pub mod rate_service;
pub mod transfer_service;
pub mod user_service;

pub use account_service::AccountService;
pub use charges_service::ChargesService;
pub use rate_service::RateService;
pub use transfer_service::TransferService;
pub use user_service::{PinVerifier, UserService};
