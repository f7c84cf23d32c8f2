//! Wire models exchanged with the read and ingestion services.
//!
//! These are transient copies of backend-owned data. Apart from required-field presence the
//! client enforces nothing about them.

use chrono::NaiveDate;
use healthtrends_types::{NonEmptyText, TestCode};
use serde::{Deserialize, Serialize};

// ============================================================================
// Patients
// ============================================================================

/// Patient reference as listed by the read endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Profile a patient submits after signing up.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub full_name: NonEmptyText,
    pub dob: NaiveDate,
    pub gender: NonEmptyText,
}

// ============================================================================
// Lab results
// ============================================================================

/// One test result ready to submit to the ingestion pipeline.
///
/// `test_code` is upper-cased and `test_date` is already normalised to `YYYY-MM-DD HH:MM:SS`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabResult {
    pub patient_id: NonEmptyText,
    pub test_code: NonEmptyText,
    pub test_name: NonEmptyText,
    pub value: f64,
    pub unit: NonEmptyText,
    pub test_date: String,
}

/// Response of the range delete on the lab endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DeleteResultsResponse {
    pub message: String,
    #[serde(default)]
    pub count: u64,
}

// ============================================================================
// Catalog
// ============================================================================

/// Test catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
}

/// New catalog entry submitted by an administrator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewCatalogEntry {
    pub code: TestCode,
    pub name: NonEmptyText,
    pub unit: NonEmptyText,
}

/// A test that has at least one result for a given patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvailableTest {
    pub test_code: String,
    pub test_name: String,
    #[serde(default)]
    pub unit: Option<String>,
}

// ============================================================================
// Trends
// ============================================================================

/// One point of the daily history with the backend's 3-point moving average.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub test_date: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub moving_avg_3_points: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendHistory {
    pub patient_id: String,
    pub test_code: String,
    #[serde(default)]
    pub history: Vec<TrendPoint>,
}

/// One month of the pre-aggregated monthly view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub date: String,
    pub average: f64,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrends {
    #[serde(default)]
    pub monthly_data: Vec<MonthlyPoint>,
}

// ============================================================================
// Risk analysis
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "none", alias = "NONE")]
    None,
}

/// Backend risk classification for one patient/test series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub trend: String,
    pub alert_level: AlertLevel,
    #[serde(default)]
    pub alert_message: String,
    #[serde(default)]
    pub change_percent: Option<f64>,
}

impl RiskAnalysis {
    pub const TREND_INSUFFICIENT: &'static str = "insufficient_data";
    pub const TREND_STABLE: &'static str = "stable";

    /// Whether the alert should be shown at all.
    pub fn is_displayable(&self) -> bool {
        self.alert_level != AlertLevel::None && self.trend != Self::TREND_INSUFFICIENT
    }

    /// One-line alert text, or `None` when nothing should be shown.
    pub fn headline(&self) -> Option<String> {
        if !self.is_displayable() {
            return None;
        }

        let prefix = match self.alert_level {
            AlertLevel::Critical => "URGENT: ",
            AlertLevel::Warning => "TREND ALERT: ",
            AlertLevel::Info => "INFO: ",
            AlertLevel::None => "",
        };

        let mut line = format!("{prefix}{}", self.alert_message);
        if let Some(change) = self.change_percent {
            if self.trend != Self::TREND_STABLE {
                line.push_str(&format!(" (average change: {change}%)"));
            }
        }
        Some(line)
    }
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoleAssignment {
    pub email: NonEmptyText,
    pub role: String,
}

/// Generic `{ "message": ... }` acknowledgement returned by most write endpoints.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
