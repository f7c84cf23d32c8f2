//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the client and the
//! views. Nothing below the binary reads process-wide environment variables while a command is
//! running; the `*_from_env_value` helpers take the raw values so the binary decides where they
//! come from.

use crate::constants::{
    DEFAULT_COGNITO_REGION, DEFAULT_REFRESH_DELAY_SECS, SESSION_DIR_NAME, SESSION_FILENAME,
};
use crate::validation::normalise_base_url;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Identity-provider settings used by the login command.
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    region: String,
    app_client_id: Option<String>,
    endpoint: String,
}

impl IdentityConfig {
    /// Create identity settings.
    ///
    /// When `endpoint_override` is `None` the regional Cognito identity-provider endpoint is used.
    pub fn new(
        region: Option<String>,
        app_client_id: Option<String>,
        endpoint_override: Option<String>,
    ) -> CoreResult<Self> {
        let region = non_blank(region).unwrap_or_else(|| DEFAULT_COGNITO_REGION.into());
        if !region
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(CoreError::InvalidConfig(format!(
                "cognito region is not a region name: {region}"
            )));
        }

        let endpoint = match non_blank(endpoint_override) {
            Some(url) => normalise_base_url("cognito endpoint", &url)?,
            None => format!("https://cognito-idp.{region}.amazonaws.com"),
        };

        Ok(Self {
            region,
            app_client_id: non_blank(app_client_id),
            endpoint,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn app_client_id(&self) -> Option<&str> {
        self.app_client_id.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    read_url: String,
    ingest_url: String,
    session_file: PathBuf,
    refresh_delay: Duration,
    token_override: Option<String>,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// Both service URLs are validated and stored without a trailing slash.
    pub fn new(
        read_url: &str,
        ingest_url: &str,
        session_file: PathBuf,
        refresh_delay: Duration,
    ) -> CoreResult<Self> {
        Ok(Self {
            read_url: normalise_base_url("read url", read_url)?,
            ingest_url: normalise_base_url("ingest url", ingest_url)?,
            session_file,
            refresh_delay,
            token_override: None,
        })
    }

    /// Use a fixed identity token instead of the stored session.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        self.token_override = non_blank(token);
        self
    }

    pub fn read_url(&self) -> &str {
        &self.read_url
    }

    pub fn ingest_url(&self) -> &str {
        &self.ingest_url
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    pub fn token_override(&self) -> Option<&str> {
        self.token_override.as_deref()
    }
}

/// Resolve the session file path.
///
/// An explicit override wins; otherwise the file lives under the user's home directory.
pub fn session_file_from_env_value(value: Option<String>) -> CoreResult<PathBuf> {
    if let Some(path) = non_blank(value) {
        return Ok(PathBuf::from(path));
    }

    dirs::home_dir()
        .map(|home| home.join(SESSION_DIR_NAME).join(SESSION_FILENAME))
        .ok_or_else(|| {
            CoreError::InvalidConfig(
                "no home directory; set HEALTHTRENDS_SESSION_FILE explicitly".into(),
            )
        })
}

/// Parse the post-write refresh delay from an optional seconds value.
///
/// If `value` is `None` or blank, returns the default delay.
pub fn refresh_delay_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    match non_blank(value) {
        None => Ok(Duration::from_secs(DEFAULT_REFRESH_DELAY_SECS)),
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| CoreError::InvalidConfig(format!("refresh delay is not whole seconds: {v}"))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_defaults_to_regional_endpoint() {
        let identity = IdentityConfig::new(None, Some("client-123".into()), None).unwrap();
        assert_eq!(identity.region(), "us-east-1");
        assert_eq!(
            identity.endpoint(),
            "https://cognito-idp.us-east-1.amazonaws.com"
        );
        assert_eq!(identity.app_client_id(), Some("client-123"));
    }

    #[test]
    fn identity_rejects_odd_region() {
        assert!(IdentityConfig::new(Some("us east".into()), None, None).is_err());
    }

    #[test]
    fn blank_client_id_is_none() {
        let identity = IdentityConfig::new(None, Some("  ".into()), None).unwrap();
        assert_eq!(identity.app_client_id(), None);
    }

    #[test]
    fn config_normalises_urls() {
        let cfg = ClientConfig::new(
            "http://alb.example.com/",
            "https://api.example.com/prod/ingest",
            PathBuf::from("/tmp/session.json"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(cfg.read_url(), "http://alb.example.com");
        assert_eq!(cfg.ingest_url(), "https://api.example.com/prod/ingest");
        assert_eq!(cfg.token_override(), None);
    }

    #[test]
    fn refresh_delay_parsing() {
        assert_eq!(
            refresh_delay_from_env_value(None).unwrap(),
            Duration::from_secs(5)
        );
        assert_eq!(
            refresh_delay_from_env_value(Some("0".into())).unwrap(),
            Duration::ZERO
        );
        assert!(refresh_delay_from_env_value(Some("soon".into())).is_err());
    }

    #[test]
    fn session_file_override_wins() {
        let path = session_file_from_env_value(Some("/var/tmp/ht.json".into())).unwrap();
        assert_eq!(path, PathBuf::from("/var/tmp/ht.json"));
    }
}
