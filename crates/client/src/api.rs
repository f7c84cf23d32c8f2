//! Typed client for the read/query and ingestion services.
//!
//! Every call re-reads the session, attaches `Authorization: Bearer <id token>`, issues exactly
//! one request and decodes the JSON body. Nothing is retried or queued.

use crate::provider::SessionProvider;
use crate::{ClientError, ClientResult};
use healthtrends_core::deletion::DeleteTarget;
use healthtrends_core::ingest::parse_batch;
use healthtrends_core::models::{
    AvailableTest, CatalogEntry, DeleteResultsResponse, LabResult, MessageResponse, MonthlyTrends,
    NewCatalogEntry, Patient, ProfileUpdate, RiskAnalysis, RoleAssignment, TrendHistory,
};
use healthtrends_core::{routes, search, ClientConfig, DateRange, Session};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client timeout for backend requests.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct HealthTrendsClient {
    http: reqwest::Client,
    read_url: String,
    ingest_url: String,
    refresh_delay: Duration,
    sessions: SessionProvider,
}

impl HealthTrendsClient {
    pub fn new(cfg: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            read_url: cfg.read_url().to_string(),
            ingest_url: cfg.ingest_url().to_string(),
            refresh_delay: cfg.refresh_delay(),
            sessions: SessionProvider::from_config(cfg),
        })
    }

    /// Wait between a write and the re-fetch that should observe it.
    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// Current session; fails with `NoSession` when the user must log in again.
    pub fn session(&self) -> ClientResult<Session> {
        self.sessions.current()
    }

    // ------------------------------------------------------------------------
    // Patients
    // ------------------------------------------------------------------------

    pub async fn list_patients(&self) -> ClientResult<Vec<Patient>> {
        let body: serde_json::Value = self.get(routes::PATIENTS).await?;
        Ok(search::decode_patient_list(body))
    }

    pub async fn update_profile(&self, profile: &ProfileUpdate) -> ClientResult<MessageResponse> {
        let rb = self
            .authorised(Method::POST, &self.read(routes::PATIENT_PROFILE))?
            .json(profile);
        self.send(rb, routes::PATIENT_PROFILE).await
    }

    // ------------------------------------------------------------------------
    // Trends
    // ------------------------------------------------------------------------

    pub async fn available_tests(&self, patient_id: &str) -> ClientResult<Vec<AvailableTest>> {
        self.get(&routes::available_tests(patient_id)?).await
    }

    pub async fn trend_history(
        &self,
        patient_id: &str,
        test_code: &str,
        range: &DateRange,
    ) -> ClientResult<TrendHistory> {
        let path = routes::trends(patient_id, test_code)?;
        let rb = self
            .authorised(Method::GET, &self.read(&path))?
            .query(&range.query_pairs());
        self.send(rb, &path).await
    }

    pub async fn monthly_trends(
        &self,
        patient_id: &str,
        test_code: &str,
    ) -> ClientResult<MonthlyTrends> {
        self.get(&routes::monthly_trends(patient_id, test_code)?)
            .await
    }

    pub async fn risk_analysis(
        &self,
        patient_id: &str,
        test_code: &str,
    ) -> ClientResult<RiskAnalysis> {
        self.get(&routes::risk_analysis(patient_id, test_code)?)
            .await
    }

    // ------------------------------------------------------------------------
    // Lab
    // ------------------------------------------------------------------------

    /// Submit one result to the ingestion endpoint. The pipeline is asynchronous, so a success
    /// only means "accepted".
    pub async fn ingest(&self, result: &LabResult) -> ClientResult<MessageResponse> {
        let rb = self
            .authorised(Method::POST, &self.ingest_url)?
            .json(result);
        self.send(rb, &self.ingest_url).await
    }

    /// Send an already validated batch in one request.
    pub async fn upload_batch(&self, results: &[LabResult]) -> ClientResult<MessageResponse> {
        let rb = self
            .authorised(Method::POST, &self.read(routes::LAB_UPLOAD))?
            .json(results);
        self.send(rb, routes::LAB_UPLOAD).await
    }

    /// Validate a JSON upload and send it. A batch failing validation sends nothing.
    pub async fn upload_json(&self, json: &str) -> ClientResult<MessageResponse> {
        let results = parse_batch(json)?;
        tracing::info!("uploading {} lab results", results.len());
        self.upload_batch(&results).await
    }

    /// Delete a patient's results for one test within an inclusive date range.
    pub async fn delete_results(
        &self,
        patient_id: &str,
        test_code: &str,
        range: &DateRange,
    ) -> ClientResult<DeleteResultsResponse> {
        let [start, end] = range.query_pairs();
        let rb = self
            .authorised(Method::DELETE, &self.read(routes::LAB_DELETE_RESULTS))?
            .query(&[
                ("patient_id", patient_id.to_string()),
                ("test_code", test_code.to_string()),
                (start.0, start.1),
                (end.0, end.1),
            ]);
        self.send(rb, routes::LAB_DELETE_RESULTS).await
    }

    // ------------------------------------------------------------------------
    // Admin and catalog
    // ------------------------------------------------------------------------

    pub async fn assign_role(&self, assignment: &RoleAssignment) -> ClientResult<MessageResponse> {
        let rb = self
            .authorised(Method::POST, &self.read(routes::ADMIN_ASSIGN_ROLE))?
            .json(assignment);
        self.send(rb, routes::ADMIN_ASSIGN_ROLE).await
    }

    pub async fn catalog(&self) -> ClientResult<Vec<CatalogEntry>> {
        self.get(routes::CATALOG_TESTS).await
    }

    pub async fn create_catalog_entry(
        &self,
        entry: &NewCatalogEntry,
    ) -> ClientResult<MessageResponse> {
        let rb = self
            .authorised(Method::POST, &self.read(routes::CATALOG_TESTS))?
            .json(entry);
        self.send(rb, routes::CATALOG_TESTS).await
    }

    /// Ask the backend to add catalog entries for codes that only exist in results.
    pub async fn sync_catalog(&self) -> ClientResult<MessageResponse> {
        let rb = self.authorised(Method::POST, &self.read(routes::CATALOG_SYNC))?;
        self.send(rb, routes::CATALOG_SYNC).await
    }

    /// Issue one delete for `target`, with its force flag when `force` is set.
    ///
    /// Confirmation is the caller's job; see [`crate::delete::delete_with_confirmation`].
    pub async fn delete_record(
        &self,
        target: &DeleteTarget,
        force: bool,
    ) -> ClientResult<MessageResponse> {
        let path = target.path()?;
        let mut rb = self.authorised(Method::DELETE, &self.read(&path))?;
        if force {
            rb = rb.query(&[(target.force_param(), "true")]);
        }
        self.send(rb, &path).await
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    fn read(&self, path: &str) -> String {
        format!("{}{}", self.read_url, path)
    }

    fn authorised(&self, method: Method, url: &str) -> ClientResult<RequestBuilder> {
        let session = self.sessions.current()?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(session.id_token()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let rb = self.authorised(Method::GET, &self.read(path))?;
        self.send(rb, path).await
    }

    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder, label: &str) -> ClientResult<T> {
        let resp = rb.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, "{}", label);

        if !status.is_success() {
            return Err(ClientError::from_response(status, &body));
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            path: label.to_string(),
            source,
        })
    }
}
