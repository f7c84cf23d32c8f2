//! Classification and prompt text for destructive operations.
//!
//! The first confirmation depends on what kind of record is being removed. A second
//! confirmation is only shown after the backend answers 409, and accepting it resends the same
//! delete with the target's force flag.

use crate::models::{CatalogEntry, Patient};
use crate::routes::{self, CATALOG_FORCE_PARAM, PATIENT_FORCE_PARAM};
use crate::CoreResult;

/// What kind of record a delete would remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordClass {
    /// A patient with a registered account (has an email).
    ActiveAccount,
    /// Lab results filed under an id that never completed sign-up.
    OrphanedRecord,
    /// A catalog test type; results recorded against it are its dependents.
    CatalogEntry,
}

impl RecordClass {
    pub fn of_patient(patient: &Patient) -> Self {
        match patient.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => RecordClass::ActiveAccount,
            _ => RecordClass::OrphanedRecord,
        }
    }
}

/// A record an administrator has asked to delete.
#[derive(Clone, Debug, PartialEq)]
pub enum DeleteTarget {
    Patient(Patient),
    CatalogEntry(CatalogEntry),
}

impl DeleteTarget {
    pub fn class(&self) -> RecordClass {
        match self {
            DeleteTarget::Patient(p) => RecordClass::of_patient(p),
            DeleteTarget::CatalogEntry(_) => RecordClass::CatalogEntry,
        }
    }

    pub fn path(&self) -> CoreResult<String> {
        match self {
            DeleteTarget::Patient(p) => routes::admin_user(&p.id),
            DeleteTarget::CatalogEntry(c) => routes::catalog_test(&c.code),
        }
    }

    /// Query parameter that forces the delete through a conflict.
    pub fn force_param(&self) -> &'static str {
        match self {
            DeleteTarget::Patient(_) => PATIENT_FORCE_PARAM,
            DeleteTarget::CatalogEntry(_) => CATALOG_FORCE_PARAM,
        }
    }

    fn label(&self) -> String {
        match self {
            DeleteTarget::Patient(p) => format!("{} [{}]", p.name, p.id),
            DeleteTarget::CatalogEntry(c) => format!("{} ({})", c.name, c.code),
        }
    }

    /// Text of the first, blocking confirmation.
    pub fn confirmation_prompt(&self) -> String {
        let label = self.label();
        match self.class() {
            RecordClass::ActiveAccount => format!(
                "Delete the account of {label}? The user will lose access and all of their \
                 lab results will be removed."
            ),
            RecordClass::OrphanedRecord => format!(
                "Delete the orphaned record {label}? It has lab results but no registered \
                 account; the results will be removed."
            ),
            RecordClass::CatalogEntry => format!(
                "Delete the catalog test {label}? Patient results recorded with this test may \
                 depend on it."
            ),
        }
    }

    /// Text of the second confirmation shown after a 409 conflict.
    pub fn force_prompt(&self, conflict_detail: &str) -> String {
        let consequence = match self.class() {
            RecordClass::CatalogEntry => "the dependent results will be deleted as well",
            RecordClass::ActiveAccount | RecordClass::OrphanedRecord => {
                "the linked data will be deleted as well"
            }
        };
        format!(
            "The server refused: {conflict_detail}\nForce the delete of {}? {consequence}.",
            self.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(email: Option<&str>) -> Patient {
        Patient {
            id: "8c1f0e2a".into(),
            name: "Ana Garcia".into(),
            email: email.map(Into::into),
        }
    }

    #[test]
    fn email_marks_active_account() {
        assert_eq!(
            RecordClass::of_patient(&patient(Some("ana@example.com"))),
            RecordClass::ActiveAccount
        );
        assert_eq!(
            RecordClass::of_patient(&patient(Some(" "))),
            RecordClass::OrphanedRecord
        );
        assert_eq!(
            RecordClass::of_patient(&patient(None)),
            RecordClass::OrphanedRecord
        );
    }

    #[test]
    fn prompts_differ_by_class() {
        let active = DeleteTarget::Patient(patient(Some("ana@example.com")));
        let orphan = DeleteTarget::Patient(patient(None));
        let catalog = DeleteTarget::CatalogEntry(CatalogEntry {
            code: "LDL".into(),
            name: "LDL Cholesterol".into(),
            unit: Some("mg/dL".into()),
        });

        assert!(active.confirmation_prompt().contains("account of Ana Garcia"));
        assert!(orphan.confirmation_prompt().contains("orphaned record"));
        assert!(catalog.confirmation_prompt().contains("catalog test LDL Cholesterol (LDL)"));
        assert_ne!(active.confirmation_prompt(), orphan.confirmation_prompt());
    }

    #[test]
    fn force_param_and_paths() {
        let orphan = DeleteTarget::Patient(patient(None));
        assert_eq!(orphan.force_param(), "force");
        assert_eq!(orphan.path().unwrap(), "/admin/users/8c1f0e2a");

        let catalog = DeleteTarget::CatalogEntry(CatalogEntry {
            code: "LDL".into(),
            name: "LDL".into(),
            unit: None,
        });
        assert_eq!(catalog.force_param(), "cascade");
        assert!(catalog
            .force_prompt("3 results use this test")
            .contains("3 results use this test"));
    }
}
