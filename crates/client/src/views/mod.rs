//! Per-screen view state.
//!
//! Each view owns the data its screen shows and a single status line. Fetch failures never
//! propagate out of a view: they are turned into the status line and the affected data is left
//! cleared.

mod admin;
mod doctor;
mod lab;
mod patient;
mod trends;

pub use admin::AdminView;
pub use doctor::DoctorView;
pub use lab::LabView;
pub use patient::PatientView;
pub use trends::TrendPanel;

use crate::{ClientError, ErrorClass};

/// One-line feedback shown under a screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error { class: ErrorClass, message: String },
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Status::Info(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error { .. })
    }

    /// Whether the user has to log in again before anything else will work.
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            Status::Error {
                class: ErrorClass::NoSession,
                ..
            }
        )
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Info(message) | Status::Error { message, .. } => message,
        }
    }
}

impl From<&ClientError> for Status {
    fn from(e: &ClientError) -> Self {
        tracing::debug!("surfacing error as status: {}", e);
        Status::Error {
            class: e.class(),
            message: e.status_line(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Store the error of `result` in `status` and hand back the value, if any.
fn settle<T>(status: &mut Option<Status>, result: Result<T, ClientError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            *status = Some(Status::from(&e));
            None
        }
    }
}
