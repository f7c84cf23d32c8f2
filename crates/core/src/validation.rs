//! Input validation utilities.
//!
//! This module contains functions for validating user inputs before they are used to build
//! requests against the backend services.

use crate::{CoreError, CoreResult};

/// Validates a service base URL and returns it without a trailing slash.
///
/// Guardrails:
/// - Rejects empty or whitespace-only strings
/// - Requires an `http://` or `https://` scheme
/// - Rejects embedded whitespace and non-ASCII characters
///
/// # Errors
///
/// Returns `CoreError::InvalidConfig` naming `label` if the URL is invalid.
pub fn normalise_base_url(label: &str, url: &str) -> CoreResult<String> {
    let url = url.trim();

    if url.is_empty() {
        return Err(CoreError::InvalidConfig(format!("{label} cannot be empty")));
    }

    if !url.is_ascii() || url.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidConfig(format!(
            "{label} must be ASCII with no whitespace"
        )));
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| CoreError::InvalidConfig(format!("{label} must start with http(s)://")))?;

    if rest.trim_end_matches('/').is_empty() {
        return Err(CoreError::InvalidConfig(format!("{label} has no host")));
    }

    Ok(url.trim_end_matches('/').to_string())
}

/// Validates that a path segment (patient id, test code) is safe to splice into a URL path.
///
/// # Errors
///
/// `CoreError::InvalidInput` for blank input, `.` or `..`, or characters outside
/// `A-Za-z0-9._-@+`.
pub fn validate_path_segment(label: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{label} cannot be empty")));
    }

    // Dot segments are collapsed by URL normalisation and would address the parent route.
    if matches!(value, "." | "..") {
        return Err(CoreError::InvalidInput(format!(
            "{label} cannot be a relative path segment"
        )));
    }

    let ok = value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_' | b'@' | b'+'));

    if !ok {
        return Err(CoreError::InvalidInput(format!(
            "{label} contains characters not allowed in a URL path segment"
        )));
    }

    Ok(())
}
