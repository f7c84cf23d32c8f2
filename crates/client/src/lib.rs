//! # HealthTrends Client
//!
//! Network side of the HealthTrends client:
//! - Typed HTTP client for the read and ingestion services (`api`)
//! - Cognito login (`identity`), the session file (`store`) and the per-call session check
//!   (`provider`)
//! - Delete-with-confirmation flow (`delete`) and refresh-after-write (`refresh`)
//! - Per-screen view state that turns failures into a one-line status (`views`)
//!
//! Pure domain rules (roles, batch validation, date ranges, routes) live in `healthtrends-core`.

pub mod api;
pub mod delete;
pub mod error;
pub mod identity;
pub mod provider;
pub mod refresh;
pub mod store;
pub mod views;

#[cfg(test)]
mod test_support;

pub use api::HealthTrendsClient;
pub use delete::{delete_with_confirmation, Confirmer, DeleteOutcome};
pub use error::{ClientError, ClientResult, ErrorClass};
pub use identity::CognitoIdentity;
pub use provider::SessionProvider;
pub use store::{SessionStore, StoredSession};
pub use views::Status;
