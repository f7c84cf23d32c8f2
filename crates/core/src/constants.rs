//! Constants used throughout the HealthTrends core crate.
//!
//! Group names, thresholds and defaults live here so that the client, the views and the CLI
//! agree on them.

/// Identity-provider group granting administrative access.
pub const GROUP_ADMINS: &str = "Admins";

/// Identity-provider group granting laboratory upload access.
pub const GROUP_LABS: &str = "Labs";

/// Identity-provider group granting read access to every patient.
pub const GROUP_DOCTORS: &str = "Doctors";

/// Identity-provider group for patients reading their own record.
pub const GROUP_PATIENTS: &str = "Patients";

/// Ranges spanning more days than this also load the monthly aggregate.
pub const MONTHLY_THRESHOLD_DAYS: i64 = 90;

/// Length of the default date range, in months, ending today.
pub const DEFAULT_RANGE_MONTHS: u32 = 12;

/// Seconds to wait after a write before re-fetching.
pub const DEFAULT_REFRESH_DELAY_SECS: u64 = 5;

/// Default AWS region of the identity user pool.
pub const DEFAULT_COGNITO_REGION: &str = "us-east-1";

/// Directory (under the home directory) holding the session file.
pub const SESSION_DIR_NAME: &str = ".healthtrends";

/// Filename of the stored session.
pub const SESSION_FILENAME: &str = "session.json";

/// Timestamp layout the ingestion pipeline stores.
pub const SUBMIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Query date layout used by the read endpoint.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Catalog fallbacks for the two tests the lab screen always offers.
pub const BUILTIN_TESTS: &[(&str, &str, &str)] = &[
    ("HBA1C", "Hemoglobin A1c", "%"),
    ("GLUCOSE", "Glucose", "mg/dL"),
];
