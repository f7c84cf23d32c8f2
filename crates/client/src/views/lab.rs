use super::{settle, Status};
use crate::api::HealthTrendsClient;
use crate::{ClientError, ClientResult};
use chrono::NaiveDateTime;
use healthtrends_core::ingest::{builtin_test, parse_test_date, RowProblem};
use healthtrends_core::models::{CatalogEntry, LabResult};
use healthtrends_core::{CoreError, DateRange, NonEmptyText};

/// Laboratory screen: single results, bulk uploads and range deletes.
#[derive(Clone, Debug, Default)]
pub struct LabView {
    catalog: Vec<CatalogEntry>,
    rejected_rows: Vec<RowProblem>,
    status: Option<Status>,
}

impl LabView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Per-row problems of the last rejected upload.
    pub fn rejected_rows(&self) -> &[RowProblem] {
        &self.rejected_rows
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Load the test catalog. A failure leaves only the built-in tests available.
    pub async fn load_catalog(&mut self, client: &HealthTrendsClient) {
        match client.catalog().await {
            Ok(catalog) => self.catalog = catalog,
            Err(e) => {
                tracing::warn!("catalog unavailable, using built-in tests: {}", e);
                self.catalog.clear();
            }
        }
    }

    /// Display name and unit for a test code, from the catalog or the built-in defaults.
    pub fn describe(&self, code: &str) -> Option<(String, String)> {
        let upper = code.trim().to_uppercase();
        let code = upper.as_str();
        if let Some(entry) = self.catalog.iter().find(|c| c.code.as_str() == code) {
            let unit = entry
                .unit
                .clone()
                .or_else(|| builtin_test(code).map(|(_, u)| u.to_string()))
                .unwrap_or_default();
            return Some((entry.name.clone(), unit));
        }
        builtin_test(code).map(|(name, unit)| (name.to_string(), unit.to_string()))
    }

    /// Build one result from form input, taking name and unit from [`Self::describe`].
    pub fn build_result(
        &self,
        patient_id: &str,
        test_code: &str,
        value: f64,
        test_date: &str,
    ) -> ClientResult<LabResult> {
        let code = NonEmptyText::new(test_code)
            .map_err(CoreError::from)?
            .to_uppercase();
        let (name, unit) = self.describe(code.as_str()).ok_or_else(|| {
            CoreError::InvalidInput(format!("unknown test code {code}; add it to the catalog"))
        })?;
        let taken_at: NaiveDateTime = parse_test_date(test_date)?;

        let result = LabResult::new(
            NonEmptyText::new(patient_id).map_err(CoreError::from)?,
            code,
            NonEmptyText::new(name).map_err(CoreError::from)?,
            value,
            NonEmptyText::new(unit).map_err(CoreError::from)?,
            taken_at,
        )?;
        Ok(result)
    }

    /// Submit one result. Returns the accepted result so the caller can refresh its series.
    pub async fn submit(
        &mut self,
        client: &HealthTrendsClient,
        patient_id: &str,
        test_code: &str,
        value: f64,
        test_date: &str,
    ) -> Option<LabResult> {
        self.status = None;
        let built = self.build_result(patient_id, test_code, value, test_date);
        let result = settle(&mut self.status, built)?;

        settle(&mut self.status, client.ingest(&result).await)?;
        self.status = Some(Status::Info(format!(
            "Result sent: {} {} for {}. Waiting for processing...",
            result.value, result.unit, result.patient_id
        )));
        Some(result)
    }

    /// Validate and upload a JSON batch. An invalid batch is rejected whole and nothing is sent.
    pub async fn upload(&mut self, client: &HealthTrendsClient, json: &str) -> bool {
        self.status = None;
        self.rejected_rows.clear();

        match client.upload_json(json).await {
            Ok(ack) => {
                self.status = Some(Status::Info(ack.message));
                true
            }
            Err(ClientError::Core(CoreError::BatchRejected { total, problems })) => {
                self.status = Some(Status::Error {
                    class: crate::ErrorClass::Other,
                    message: format!(
                        "Error: upload rejected, {} of {total} rows failed checks; nothing was sent.",
                        problems.len()
                    ),
                });
                self.rejected_rows = problems;
                false
            }
            Err(e) => {
                self.status = Some(Status::from(&e));
                false
            }
        }
    }

    /// Delete one test's results for a patient within an inclusive range.
    pub async fn delete_results(
        &mut self,
        client: &HealthTrendsClient,
        patient_id: &str,
        test_code: &str,
        range: &DateRange,
    ) -> Option<u64> {
        self.status = None;
        let resp = settle(
            &mut self.status,
            client.delete_results(patient_id, test_code, range).await,
        )?;
        self.status = Some(Status::Info(resp.message));
        Some(resp.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{token_for, StubBackend};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn name_and_unit_come_from_catalog_then_builtins() {
        let stub = StubBackend::start(|_| {
            (
                StatusCode::OK,
                json!([
                    { "code": "LDL", "name": "LDL Cholesterol", "unit": "mg/dL" },
                    { "code": "HBA1C", "name": "Glycated haemoglobin", "unit": null }
                ]),
            )
        })
        .await;
        let client = stub.client(&token_for("lab", &["Labs"]));
        let mut view = LabView::new();
        view.load_catalog(&client).await;

        assert_eq!(
            view.describe("ldl"),
            Some(("LDL Cholesterol".into(), "mg/dL".into()))
        );
        assert_eq!(
            view.describe("HBA1C"),
            Some(("Glycated haemoglobin".into(), "%".into()))
        );
        assert_eq!(
            view.describe("GLUCOSE"),
            Some(("Glucose".into(), "mg/dL".into()))
        );
        assert_eq!(view.describe("TSH"), None);
    }

    #[tokio::test]
    async fn submit_normalises_and_posts_to_ingest() {
        let stub = StubBackend::start(|_| {
            (StatusCode::OK, json!({ "message": "queued" }))
        })
        .await;
        let client = stub.client(&token_for("lab", &["Labs"]));
        let mut view = LabView::new();

        let sent = view
            .submit(&client, "TEST001", "hba1c", 7.4, "2024-05-01T09:15:00")
            .await
            .unwrap();

        assert_eq!(sent.test_date, "2024-05-01 09:15:00");
        assert!(!view.status().unwrap().is_error());
        let body = stub.requests()[0].json();
        assert_eq!(body["test_code"], "HBA1C");
        assert_eq!(body["test_name"], "Hemoglobin A1c");
        assert_eq!(body["unit"], "%");
    }

    #[tokio::test]
    async fn unknown_code_is_not_sent() {
        let stub = StubBackend::start(|_| (StatusCode::OK, json!([]))).await;
        let client = stub.client(&token_for("lab", &["Labs"]));
        let mut view = LabView::new();

        assert!(view
            .submit(&client, "TEST001", "TSH", 2.1, "2024-05-01")
            .await
            .is_none());
        assert!(view.status().unwrap().is_error());
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn rejected_upload_lists_rows_and_sends_nothing() {
        let stub = StubBackend::start(|_| (StatusCode::OK, json!({ "message": "ok" }))).await;
        let client = stub.client(&token_for("lab", &["Labs"]));
        let mut view = LabView::new();

        let upload = json!([
            { "patient_id": "P1", "test_code": "HBA1C", "test_name": "Hemoglobin A1c",
              "value": 6.1, "unit": "%", "test_date": "2024-05-01 08:00:00" },
            { "patient_id": "P2", "test_name": "Glucose",
              "value": 101, "unit": "mg/dL", "test_date": "2024-05-01 08:00:00" }
        ])
        .to_string();

        assert!(!view.upload(&client, &upload).await);
        assert_eq!(view.rejected_rows().len(), 1);
        assert_eq!(view.rejected_rows()[0].row, 2);
        assert_eq!(view.rejected_rows()[0].to_string(), "row 2: missing test_code");
        assert!(view.status().unwrap().message().contains("nothing was sent"));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn range_delete_reports_count() {
        let stub = StubBackend::start(|_| {
            (
                StatusCode::OK,
                json!({ "message": "Deleted 3 records.", "count": 3 }),
            )
        })
        .await;
        let client = stub.client(&token_for("lab", &["Labs"]));
        let mut view = LabView::new();
        let range = DateRange::from_bounds(
            Some("2024-01-01"),
            Some("2024-01-31"),
            chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();

        let count = view.delete_results(&client, "P1", "HBA1C", &range).await;

        assert_eq!(count, Some(3));
        assert_eq!(view.status().unwrap().message(), "Deleted 3 records.");
    }
}
