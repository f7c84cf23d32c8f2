//! Route table for the read/query service.
//!
//! Every path the client calls is built here, so there is exactly one backend contract.
//! Identifiers spliced into paths are validated first.

use crate::validation::validate_path_segment;
use crate::CoreResult;

pub const PATIENTS: &str = "/patients";
pub const PATIENT_PROFILE: &str = "/patients/profile";
pub const LAB_UPLOAD: &str = "/lab/upload-results";
pub const LAB_DELETE_RESULTS: &str = "/lab/delete-results";
pub const ADMIN_ASSIGN_ROLE: &str = "/admin/assign-role";
pub const CATALOG_TESTS: &str = "/catalog/tests";
pub const CATALOG_SYNC: &str = "/catalog/tests/sync";

/// Query flag resending a patient delete despite a conflict.
pub const PATIENT_FORCE_PARAM: &str = "force";

/// Query flag resending a catalog delete and cascading to dependent results.
pub const CATALOG_FORCE_PARAM: &str = "cascade";

pub fn available_tests(patient_id: &str) -> CoreResult<String> {
    validate_path_segment("patient id", patient_id)?;
    Ok(format!("/patient/{patient_id}/available_tests"))
}

pub fn trends(patient_id: &str, test_code: &str) -> CoreResult<String> {
    patient_test_path(patient_id, "trends", test_code)
}

pub fn monthly_trends(patient_id: &str, test_code: &str) -> CoreResult<String> {
    patient_test_path(patient_id, "monthly-trends", test_code)
}

pub fn risk_analysis(patient_id: &str, test_code: &str) -> CoreResult<String> {
    patient_test_path(patient_id, "risk-analysis", test_code)
}

pub fn admin_user(user_id: &str) -> CoreResult<String> {
    validate_path_segment("user id", user_id)?;
    Ok(format!("/admin/users/{user_id}"))
}

pub fn catalog_test(code: &str) -> CoreResult<String> {
    validate_path_segment("test code", code)?;
    Ok(format!("{CATALOG_TESTS}/{code}"))
}

fn patient_test_path(patient_id: &str, resource: &str, test_code: &str) -> CoreResult<String> {
    validate_path_segment("patient id", patient_id)?;
    validate_path_segment("test code", test_code)?;
    Ok(format!("/patient/{patient_id}/{resource}/{test_code}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_trend_paths() {
        assert_eq!(
            trends("TEST001", "HBA1C").unwrap(),
            "/patient/TEST001/trends/HBA1C"
        );
        assert_eq!(
            monthly_trends("TEST001", "HBA1C").unwrap(),
            "/patient/TEST001/monthly-trends/HBA1C"
        );
        assert_eq!(
            risk_analysis("TEST001", "GLUCOSE").unwrap(),
            "/patient/TEST001/risk-analysis/GLUCOSE"
        );
        assert_eq!(
            available_tests("TEST001").unwrap(),
            "/patient/TEST001/available_tests"
        );
    }

    #[test]
    fn builds_admin_paths() {
        assert_eq!(admin_user("8c1f0e2a").unwrap(), "/admin/users/8c1f0e2a");
        assert_eq!(catalog_test("LDL").unwrap(), "/catalog/tests/LDL");
    }

    #[test]
    fn refuses_unsafe_segments() {
        assert!(trends("P1/../../admin", "HBA1C").is_err());
        assert!(catalog_test("a b").is_err());
        assert!(admin_user("..").is_err());
        assert!(available_tests(".").is_err());
    }
}
