use super::{settle, Status};
use crate::api::HealthTrendsClient;
use crate::delete::{delete_with_confirmation, Confirmer};
use crate::refresh::refresh_after;
use crate::ClientResult;
use healthtrends_core::models::{CatalogEntry, NewCatalogEntry, Patient, RoleAssignment};
use healthtrends_core::{CoreError, DeleteTarget, NonEmptyText, Role, TestCode};

/// Administration screen: roles, the test catalog and patient records.
#[derive(Clone, Debug, Default)]
pub struct AdminView {
    catalog: Vec<CatalogEntry>,
    patients: Vec<Patient>,
    status: Option<Status>,
}

impl AdminView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub async fn load_catalog(&mut self, client: &HealthTrendsClient) {
        self.status = None;
        self.catalog = settle(&mut self.status, client.catalog().await).unwrap_or_default();
    }

    pub async fn load_patients(&mut self, client: &HealthTrendsClient) {
        self.status = None;
        self.patients = settle(&mut self.status, client.list_patients().await).unwrap_or_default();
    }

    /// Put the user with `email` into the group for `role`.
    pub async fn assign_role(&mut self, client: &HealthTrendsClient, email: &str, role: &str) {
        self.status = None;
        let result = match role_assignment(email, role) {
            Ok(assignment) => client
                .assign_role(&assignment)
                .await
                .map(|_| assignment.role),
            Err(e) => Err(e.into()),
        };

        if let Some(group) = settle(&mut self.status, result) {
            tracing::info!("assigned {} to {}", group, email);
            self.status = Some(Status::Info(format!("Success: {email} is now in {group}")));
        }
    }

    pub async fn create_catalog_entry(
        &mut self,
        client: &HealthTrendsClient,
        code: &str,
        name: &str,
        unit: &str,
    ) {
        self.status = None;
        let result = match new_catalog_entry(code, name, unit) {
            Ok(entry) => client.create_catalog_entry(&entry).await,
            Err(e) => Err(e.into()),
        };

        if let Some(ack) = settle(&mut self.status, result) {
            self.refresh_catalog(client).await;
            self.status = Some(Status::Info(ack.message));
        }
    }

    /// Ask the backend to add catalog entries for codes that only appear in results.
    pub async fn sync_catalog(&mut self, client: &HealthTrendsClient) {
        self.status = None;
        if let Some(ack) = settle(&mut self.status, client.sync_catalog().await) {
            self.refresh_catalog(client).await;
            self.status = Some(Status::Info(ack.message));
        }
    }

    /// Delete a catalog entry from the loaded catalog, confirming first.
    pub async fn delete_catalog_entry<C>(
        &mut self,
        client: &HealthTrendsClient,
        code: &str,
        confirmer: &mut C,
    ) where
        C: Confirmer + ?Sized,
    {
        self.status = None;
        let Some(entry) = self
            .catalog
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .cloned()
        else {
            self.status = Some(Status::info(format!("No catalog test with code {code}.")));
            return;
        };

        let target = DeleteTarget::CatalogEntry(entry);
        if self.run_delete(client, &target, confirmer).await {
            self.refresh_catalog(client).await;
        }
    }

    /// Delete a patient record from the loaded list, confirming first.
    pub async fn delete_patient<C>(
        &mut self,
        client: &HealthTrendsClient,
        patient_id: &str,
        confirmer: &mut C,
    ) where
        C: Confirmer + ?Sized,
    {
        self.status = None;
        let Some(patient) = self.patients.iter().find(|p| p.id == patient_id).cloned() else {
            self.status = Some(Status::info(format!("No patient with id {patient_id}.")));
            return;
        };

        let target = DeleteTarget::Patient(patient);
        if self.run_delete(client, &target, confirmer).await {
            let patients = refresh_after(client.refresh_delay(), || client.list_patients()).await;
            self.patients = settle(&mut self.status, patients).unwrap_or_default();
        }
    }

    /// Returns whether anything was deleted.
    async fn run_delete<C>(
        &mut self,
        client: &HealthTrendsClient,
        target: &DeleteTarget,
        confirmer: &mut C,
    ) -> bool
    where
        C: Confirmer + ?Sized,
    {
        let outcome: ClientResult<_> = delete_with_confirmation(client, target, confirmer).await;
        match settle(&mut self.status, outcome) {
            Some(outcome) => {
                let deleted = matches!(
                    outcome,
                    crate::DeleteOutcome::Deleted(_) | crate::DeleteOutcome::Forced(_)
                );
                self.status = Some(Status::Info(outcome.status_line()));
                deleted
            }
            None => false,
        }
    }

    async fn refresh_catalog(&mut self, client: &HealthTrendsClient) {
        let catalog = refresh_after(client.refresh_delay(), || client.catalog()).await;
        match catalog {
            Ok(catalog) => self.catalog = catalog,
            Err(e) => tracing::warn!("catalog refresh failed: {}", e),
        }
    }
}

fn role_assignment(email: &str, role: &str) -> Result<RoleAssignment, CoreError> {
    let role: Role = role.parse()?;
    let group = role
        .group_name()
        .ok_or_else(|| CoreError::UnknownRole(role.to_string()))?;
    Ok(RoleAssignment {
        email: NonEmptyText::new(email)?,
        role: group.to_string(),
    })
}

fn new_catalog_entry(code: &str, name: &str, unit: &str) -> Result<NewCatalogEntry, CoreError> {
    Ok(NewCatalogEntry {
        code: TestCode::new(code)?,
        name: NonEmptyText::new(name)?,
        unit: NonEmptyText::new(unit)?,
    })
}
