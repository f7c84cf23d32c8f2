//! Startup configuration read from the environment.
//!
//! Variables are read once in `main` (after `.env` is loaded) and the resulting values are
//! passed down; nothing else in the binary looks at the environment.

use anyhow::{anyhow, Context};
use healthtrends_core::config::{refresh_delay_from_env_value, session_file_from_env_value};
use healthtrends_core::{ClientConfig, IdentityConfig};
use std::path::PathBuf;
use std::time::Duration;

pub struct Settings {
    read_url: Option<String>,
    ingest_url: Option<String>,
    identity: IdentityConfig,
    session_file: PathBuf,
    refresh_delay: Duration,
    token_override: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let identity = IdentityConfig::new(
            var("HEALTHTRENDS_COGNITO_REGION"),
            var("HEALTHTRENDS_APP_CLIENT_ID"),
            var("HEALTHTRENDS_COGNITO_ENDPOINT"),
        )
        .context("invalid identity settings")?;

        Ok(Self {
            read_url: var("HEALTHTRENDS_READ_URL"),
            ingest_url: var("HEALTHTRENDS_INGEST_URL"),
            identity,
            session_file: session_file_from_env_value(var("HEALTHTRENDS_SESSION_FILE"))?,
            refresh_delay: refresh_delay_from_env_value(var("HEALTHTRENDS_REFRESH_DELAY_SECS"))?,
            token_override: var("HEALTHTRENDS_ID_TOKEN"),
        })
    }

    pub fn identity(&self) -> &IdentityConfig {
        &self.identity
    }

    pub fn session_file(&self) -> &PathBuf {
        &self.session_file
    }

    pub fn token_override(&self) -> Option<&str> {
        self.token_override.as_deref()
    }

    /// Full client configuration. Fails when the service URLs are not set.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let read_url = self
            .read_url
            .as_deref()
            .ok_or_else(|| anyhow!("HEALTHTRENDS_READ_URL is not set"))?;
        let ingest_url = self
            .ingest_url
            .as_deref()
            .ok_or_else(|| anyhow!("HEALTHTRENDS_INGEST_URL is not set"))?;

        let cfg = ClientConfig::new(
            read_url,
            ingest_url,
            self.session_file.clone(),
            self.refresh_delay,
        )?
        .with_token_override(self.token_override.clone());
        Ok(cfg)
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
