//! Patient list decoding and search.

use crate::models::Patient;
use serde_json::Value;

/// Field a patient search matches against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Name,
    Id,
}

/// Decode a patient-list response.
///
/// The read service has answered with a bare array, `{ "data": [...] }` and
/// `{ "results": [...] }` across deployments. Any other shape, or entries that do not decode,
/// produce a warning and are skipped rather than failing the screen.
///
/// Deployments that fold the account email into the display name (`Name (email)`) get the
/// email recovered from the name, so the entry still counts as a registered account.
pub fn decode_patient_list(body: Value) -> Vec<Patient> {
    let entries = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match (map.remove("data"), map.remove("results")) {
            (Some(Value::Array(items)), _) | (_, Some(Value::Array(items))) => items,
            _ => {
                tracing::warn!("unrecognised patient list shape; showing no patients");
                return Vec::new();
            }
        },
        other => {
            tracing::warn!(kind = ?value_kind(&other), "unrecognised patient list shape");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Patient>(entry) {
            Ok(mut p) => {
                if p.email.is_none() {
                    p.email = email_from_name(&p.name);
                }
                Some(p)
            }
            Err(e) => {
                tracing::warn!("skipping undecodable patient entry: {}", e);
                None
            }
        })
        .collect()
}

/// Case-insensitive substring search. An empty query matches nothing.
pub fn filter_patients<'a>(
    patients: &'a [Patient],
    query: &str,
    field: SearchField,
) -> Vec<&'a Patient> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    patients
        .iter()
        .filter(|p| {
            let target = match field {
                SearchField::Id => &p.id,
                SearchField::Name => &p.name,
            };
            target.to_lowercase().contains(&query)
        })
        .collect()
}

/// The `email` in a trailing `(email)` of a display name.
fn email_from_name(name: &str) -> Option<String> {
    let inner = name.trim_end().strip_suffix(')')?;
    let (_, candidate) = inner.rsplit_once('(')?;
    let candidate = candidate.trim();
    let (local, domain) = candidate.split_once('@')?;
    if local.is_empty() || domain.is_empty() || candidate.contains(char::is_whitespace) {
        return None;
    }
    Some(candidate.to_string())
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deletion::RecordClass;
    use serde_json::json;

    fn sample() -> Vec<Patient> {
        decode_patient_list(json!([
            { "id": "TEST001", "name": "Ana Garcia (ana@example.com)", "email": "ana@example.com" },
            { "id": "8c1f0e2a-91", "name": "Sin Nombre (ID: 8c1f0e2a...)" },
            { "id": "TEST002", "name": "Luis Perez" }
        ]))
    }

    #[test]
    fn decodes_all_known_shapes() {
        assert_eq!(sample().len(), 3);
        let wrapped = decode_patient_list(json!({ "data": [{ "id": "A", "name": "a" }] }));
        assert_eq!(wrapped.len(), 1);
        let results = decode_patient_list(json!({ "results": [{ "id": "B", "name": "b" }] }));
        assert_eq!(results[0].id, "B");
    }

    #[test]
    fn unknown_shapes_yield_empty() {
        assert!(decode_patient_list(json!({ "patients": [] })).is_empty());
        assert!(decode_patient_list(json!("nope")).is_empty());
    }

    #[test]
    fn skips_bad_entries() {
        let patients = decode_patient_list(json!([{ "id": "A", "name": "a" }, { "id": 3 }]));
        assert_eq!(patients.len(), 1);
    }

    #[test]
    fn recovers_email_folded_into_name() {
        let patients = decode_patient_list(json!([
            { "id": "TEST001", "name": "Ana Garcia (ana@example.com)" },
            { "id": "8c1f0e2a-91", "name": "Sin Nombre (ID: 8c1f0e2a...)" },
            { "id": "TEST003", "name": "Eva Ruiz (eva@old.example)", "email": "eva@example.com" }
        ]));
        assert_eq!(patients[0].email.as_deref(), Some("ana@example.com"));
        assert_eq!(
            RecordClass::of_patient(&patients[0]),
            RecordClass::ActiveAccount
        );
        assert_eq!(patients[1].email, None);
        assert_eq!(patients[2].email.as_deref(), Some("eva@example.com"));
    }

    #[test]
    fn searches_by_name_and_id() {
        let patients = sample();
        let by_name = filter_patients(&patients, "GARCIA", SearchField::Name);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "TEST001");

        let by_id = filter_patients(&patients, "test", SearchField::Id);
        assert_eq!(by_id.len(), 2);

        assert!(filter_patients(&patients, "  ", SearchField::Name).is_empty());
    }
}
