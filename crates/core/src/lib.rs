//! # HealthTrends Core
//!
//! Domain logic for the HealthTrends client that needs no network access:
//! - Wire models for patients, lab results, the test catalog, trends and risk alerts
//! - Identity-token decoding and role derivation (`session`, `role`)
//! - All-or-nothing validation of lab result batches (`ingest`)
//! - Date-range policy deciding when the monthly aggregate is loaded (`range`)
//! - Record classification and prompt text for destructive operations (`deletion`)
//! - The route table for the read service (`routes`)
//! - Startup configuration (`config`)
//!
//! **No HTTP concerns**: requests, sessions on disk and view state belong in
//! `healthtrends-client`.

pub mod config;
pub mod constants;
pub mod deletion;
pub mod error;
pub mod ingest;
pub mod models;
pub mod range;
pub mod role;
pub mod routes;
pub mod search;
pub mod session;
pub mod validation;

pub use config::{ClientConfig, IdentityConfig};
pub use deletion::{DeleteTarget, RecordClass};
pub use error::{CoreError, CoreResult};
pub use range::DateRange;
pub use role::{Role, Screen};
pub use session::Session;

pub use healthtrends_types::{NonEmptyText, TestCode, TextError};
