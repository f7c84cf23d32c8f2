use super::{settle, Status, TrendPanel};
use crate::api::HealthTrendsClient;
use chrono::NaiveDate;
use healthtrends_core::models::Patient;
use healthtrends_core::search::{filter_patients, SearchField};
use healthtrends_core::DateRange;

/// Doctor screen: patient search plus the full trend panel with risk analysis.
#[derive(Clone, Debug)]
pub struct DoctorView {
    patients: Vec<Patient>,
    selected_patient: Option<String>,
    trends: TrendPanel,
    status: Option<Status>,
}

impl DoctorView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            patients: Vec::new(),
            selected_patient: None,
            trends: TrendPanel::new(DateRange::default_ending(today), true),
            status: None,
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn trends(&self) -> &TrendPanel {
        &self.trends
    }

    pub fn trends_mut(&mut self) -> &mut TrendPanel {
        &mut self.trends
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub async fn load_patients(&mut self, client: &HealthTrendsClient) {
        self.status = None;
        self.patients = settle(&mut self.status, client.list_patients().await).unwrap_or_default();
    }

    /// Patients matching `query`. An empty query matches nobody.
    pub fn search(&self, query: &str, field: SearchField) -> Vec<&Patient> {
        filter_patients(&self.patients, query, field)
    }

    /// Switch to a patient and load the tests they have results for.
    pub async fn select_patient(&mut self, client: &HealthTrendsClient, patient_id: &str) {
        self.status = None;
        if self.selected_patient.as_deref() != Some(patient_id) {
            self.trends.clear();
            self.selected_patient = Some(patient_id.to_string());
        }
        settle(
            &mut self.status,
            self.trends.load_tests(client, patient_id).await,
        );
    }

    /// Load history, monthly aggregate and risk for the selected patient and test.
    pub async fn load_trends(&mut self, client: &HealthTrendsClient) {
        self.status = None;
        let Some(patient_id) = self.selected_patient.clone() else {
            self.status = Some(Status::info("Select a patient first."));
            return;
        };
        settle(
            &mut self.status,
            self.trends.smart_load(client, &patient_id).await,
        );
    }
}
