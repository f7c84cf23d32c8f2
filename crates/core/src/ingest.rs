//! Client-side checks for lab results before they reach the ingestion pipeline.
//!
//! A batch is all-or-nothing: every row must carry the required fields and a parseable date,
//! otherwise the whole batch is rejected locally and nothing is sent.

use crate::constants::{BUILTIN_TESTS, SUBMIT_DATE_FORMAT};
use crate::models::LabResult;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use healthtrends_types::NonEmptyText;
use serde_json::{Map, Value};

/// Fields every row must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "patient_id",
    "test_code",
    "test_name",
    "value",
    "unit",
    "test_date",
];

/// Why a single row failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowFault {
    NotAnObject,
    Missing(&'static str),
    Invalid { field: &'static str, detail: String },
    UnparseableDate(String),
}

/// A failed row, numbered from 1 as a user would count lines in the upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowProblem {
    pub row: usize,
    pub fault: RowFault,
}

impl std::fmt::Display for RowProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.fault {
            RowFault::NotAnObject => write!(f, "row {}: not a JSON object", self.row),
            RowFault::Missing(field) => write!(f, "row {}: missing {field}", self.row),
            RowFault::Invalid { field, detail } => {
                write!(f, "row {}: invalid {field} ({detail})", self.row)
            }
            RowFault::UnparseableDate(raw) => {
                write!(f, "row {}: unparseable test_date {raw:?}", self.row)
            }
        }
    }
}

/// Parse a timestamp in any of the layouts the upload screens have accepted.
///
/// Accepted: `YYYY-MM-DD HH:MM:SS`, RFC 3339, `YYYY-MM-DDTHH:MM:SS` and a bare `YYYY-MM-DD`
/// (midnight). RFC 3339 input keeps its local clock time.
pub fn parse_test_date(raw: &str) -> CoreResult<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, SUBMIT_DATE_FORMAT) {
        return Ok(dt);
    }
    // The sample's wall-clock time is kept; the offset is dropped, not applied.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt);
    }

    Err(CoreError::InvalidDate(raw.to_string()))
}

/// Catalog fallback for the tests the lab screen always offers.
///
/// `code` is compared as given; callers pass the upper-cased code.
pub fn builtin_test(code: &str) -> Option<(&'static str, &'static str)> {
    BUILTIN_TESTS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, unit)| (*name, *unit))
}

impl LabResult {
    /// The code is upper-cased here. Only presence is required of it, so codes the catalog
    /// could not hold as a path segment (`VIT D`) still go through.
    pub fn new(
        patient_id: NonEmptyText,
        test_code: NonEmptyText,
        test_name: NonEmptyText,
        value: f64,
        unit: NonEmptyText,
        taken_at: NaiveDateTime,
    ) -> CoreResult<Self> {
        if !value.is_finite() {
            return Err(CoreError::InvalidInput(format!(
                "value must be a finite number, got {value}"
            )));
        }

        Ok(Self {
            patient_id,
            test_code: test_code.to_uppercase(),
            test_name,
            value,
            unit,
            test_date: taken_at.format(SUBMIT_DATE_FORMAT).to_string(),
        })
    }
}

/// Parse a JSON upload and validate every row.
///
/// # Errors
///
/// - `BatchNotArray` if the document is not a JSON array
/// - `EmptyBatch` if the array is empty
/// - `BatchRejected` listing every failing row if any row fails
pub fn parse_batch(json: &str) -> CoreResult<Vec<LabResult>> {
    let rows: Vec<Value> = serde_json::from_str(json).map_err(CoreError::BatchNotArray)?;
    validate_batch(&rows)
}

/// Validate already-decoded rows. See [`parse_batch`].
pub fn validate_batch(rows: &[Value]) -> CoreResult<Vec<LabResult>> {
    if rows.is_empty() {
        return Err(CoreError::EmptyBatch);
    }

    let mut accepted = Vec::with_capacity(rows.len());
    let mut problems = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match validate_row(row) {
            Ok(result) => accepted.push(result),
            Err(fault) => problems.push(RowProblem {
                row: index + 1,
                fault,
            }),
        }
    }

    if !problems.is_empty() {
        tracing::debug!(
            rejected = problems.len(),
            total = rows.len(),
            "lab batch failed client-side checks"
        );
        return Err(CoreError::BatchRejected {
            total: rows.len(),
            problems,
        });
    }

    Ok(accepted)
}

fn validate_row(row: &Value) -> Result<LabResult, RowFault> {
    let obj = row.as_object().ok_or(RowFault::NotAnObject)?;

    // Presence first so a row missing several fields reports the first one in field order.
    for field in REQUIRED_FIELDS {
        match obj.get(field) {
            None | Some(Value::Null) => return Err(RowFault::Missing(field)),
            Some(Value::String(s)) if s.trim().is_empty() => return Err(RowFault::Missing(field)),
            _ => {}
        }
    }

    let patient_id = text_field(obj, "patient_id")?;
    let test_code = text_field(obj, "test_code")?;
    let test_name = text_field(obj, "test_name")?;
    let unit = text_field(obj, "unit")?;
    let value = number_field(obj, "value")?;

    let raw_date = string_field(obj, "test_date")?;
    let taken_at =
        parse_test_date(raw_date).map_err(|_| RowFault::UnparseableDate(raw_date.to_string()))?;

    LabResult::new(patient_id, test_code, test_name, value, unit, taken_at).map_err(|e| {
        RowFault::Invalid {
            field: "value",
            detail: e.to_string(),
        }
    })
}

fn string_field<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, RowFault> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| RowFault::Invalid {
            field,
            detail: "expected a string".into(),
        })
}

fn text_field(obj: &Map<String, Value>, field: &'static str) -> Result<NonEmptyText, RowFault> {
    NonEmptyText::new(string_field(obj, field)?).map_err(|_| RowFault::Missing(field))
}

/// Numbers are accepted as JSON numbers or numeric strings (form input).
fn number_field(obj: &Map<String, Value>, field: &'static str) -> Result<f64, RowFault> {
    let invalid = |detail: String| RowFault::Invalid { field, detail };
    match obj.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("{n} is not representable"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("{s:?} is not a number"))),
        _ => Err(invalid("expected a number".into())),
    }
}
