use super::{settle, Status, TrendPanel};
use crate::api::HealthTrendsClient;
use crate::ClientResult;
use chrono::NaiveDate;
use healthtrends_core::models::ProfileUpdate;
use healthtrends_core::{CoreError, DateRange, NonEmptyText};

/// Patient screen: the user's own results, without risk analysis.
#[derive(Clone, Debug)]
pub struct PatientView {
    subject_id: String,
    trends: TrendPanel,
    status: Option<Status>,
}

impl PatientView {
    /// Bind the view to the logged-in user's subject id.
    pub fn for_current_user(client: &HealthTrendsClient, today: NaiveDate) -> ClientResult<Self> {
        let session = client.session()?;
        Ok(Self {
            subject_id: session.subject_id().to_string(),
            trends: TrendPanel::new(DateRange::default_ending(today), false),
            status: None,
        })
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
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

    pub async fn load_tests(&mut self, client: &HealthTrendsClient) {
        self.status = None;
        settle(
            &mut self.status,
            self.trends.load_tests(client, &self.subject_id).await,
        );
        if self.status.is_none() && self.trends.tests().is_empty() {
            self.status = Some(Status::info("No results on file yet."));
        }
    }

    pub async fn load_trends(&mut self, client: &HealthTrendsClient) {
        self.status = None;
        settle(
            &mut self.status,
            self.trends.smart_load(client, &self.subject_id).await,
        );
    }

    /// Send the profile completed after sign-up.
    pub async fn sync_profile(
        &mut self,
        client: &HealthTrendsClient,
        full_name: &str,
        dob: NaiveDate,
        gender: &str,
    ) {
        self.status = None;
        let result = match (NonEmptyText::new(full_name), NonEmptyText::new(gender)) {
            (Ok(full_name), Ok(gender)) => {
                let profile = ProfileUpdate {
                    full_name,
                    dob,
                    gender,
                };
                client.update_profile(&profile).await
            }
            (Err(e), _) | (_, Err(e)) => Err(CoreError::from(e).into()),
        };

        if let Some(ack) = settle(&mut self.status, result) {
            tracing::info!("profile synced for {}", self.subject_id);
            self.status = Some(Status::Info(ack.message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{token_for, StubBackend};
    use axum::http::StatusCode;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[tokio::test]
    async fn bound_to_own_subject_and_skips_risk() {
        let stub = StubBackend::start(|req| {
            if req.path.ends_with("/available_tests") {
                (
                    StatusCode::OK,
                    json!([{ "test_code": "HBA1C", "test_name": "Hemoglobin A1c", "unit": "%" }]),
                )
            } else {
                (
                    StatusCode::OK,
                    json!({ "patient_id": "ana", "test_code": "HBA1C", "history": [] }),
                )
            }
        })
        .await;
        let client = stub.client(&token_for("ana", &["Patients"]));
        let mut view = PatientView::for_current_user(&client, today()).unwrap();
        assert_eq!(view.subject_id(), "ana");

        view.trends_mut()
            .set_range(DateRange::new(today() - chrono::Days::new(30), today()).unwrap());
        view.load_tests(&client).await;
        view.load_trends(&client).await;

        assert!(view.status().is_none());
        assert_eq!(
            stub.paths(),
            vec!["/patient/ana/available_tests", "/patient/ana/trends/HBA1C"]
        );
    }

    #[tokio::test]
    async fn profile_sync_posts_profile() {
        let stub = StubBackend::start(|_| {
            (StatusCode::OK, json!({ "message": "Profile updated." }))
        })
        .await;
        let client = stub.client(&token_for("ana", &["Patients"]));
        let mut view = PatientView::for_current_user(&client, today()).unwrap();

        view.sync_profile(
            &client,
            "Ana Garcia",
            NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
            "F",
        )
        .await;

        assert_eq!(view.status().unwrap().message(), "Profile updated.");
        let req = &stub.requests()[0];
        assert_eq!(req.path, "/patients/profile");
        assert_eq!(req.json()["dob"], "1990-04-02");
        assert_eq!(req.json()["full_name"], "Ana Garcia");
    }

    #[tokio::test]
    async fn blank_profile_field_is_not_sent() {
        let stub = StubBackend::start(|_| (StatusCode::OK, json!({ "message": "ok" }))).await;
        let client = stub.client(&token_for("ana", &["Patients"]));
        let mut view = PatientView::for_current_user(&client, today()).unwrap();

        view.sync_profile(&client, "  ", today(), "F").await;

        assert!(view.status().unwrap().is_error());
        assert!(stub.requests().is_empty());
    }
}
