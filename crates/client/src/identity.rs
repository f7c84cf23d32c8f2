//! Login against the Cognito user pool.
//!
//! Uses the identity-provider JSON API directly (`InitiateAuth` with `USER_PASSWORD_AUTH`), the
//! same flow the backend's API tests use to obtain an id token. Sign-up, MFA and password-reset
//! challenges are left to the hosted UI; a challenge response is reported as an error.

use crate::api::REQUEST_TIMEOUT;
use crate::store::StoredSession;
use crate::{ClientError, ClientResult};
use chrono::Utc;
use healthtrends_core::IdentityConfig;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

const AMZ_TARGET_HEADER: &str = "X-Amz-Target";
const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
struct AuthParameters<'a> {
    #[serde(rename = "USERNAME")]
    username: &'a str,
    #[serde(rename = "PASSWORD")]
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Error body of the identity-provider API.
#[derive(Deserialize)]
struct AwsError {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

#[derive(Clone, Debug)]
pub struct CognitoIdentity {
    http: reqwest::Client,
    endpoint: String,
    app_client_id: String,
}

impl CognitoIdentity {
    pub fn new(http: reqwest::Client, identity: &IdentityConfig) -> ClientResult<Self> {
        let app_client_id = identity
            .app_client_id()
            .ok_or(ClientError::MissingAppClientId)?
            .to_string();

        Ok(Self {
            http,
            endpoint: identity.endpoint().to_string(),
            app_client_id,
        })
    }

    /// Build a login client with its own HTTP client.
    pub fn from_config(identity: &IdentityConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::new(http, identity)
    }

    /// Exchange a username and password for tokens.
    pub async fn sign_in(&self, username: &str, password: &str) -> ClientResult<StoredSession> {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.app_client_id,
            auth_parameters: AuthParameters { username, password },
        };
        let body = serde_json::to_vec(&request).map_err(ClientError::Encode)?;

        tracing::debug!("initiating auth for {} at {}", username, self.endpoint);
        let resp = self
            .http
            .post(format!("{}/", self.endpoint))
            .header(AMZ_TARGET_HEADER, INITIATE_AUTH_TARGET)
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AwsError>(&text)
                .map(|e| {
                    let kind = e.kind.rsplit('#').next().unwrap_or_default().to_string();
                    if e.message.is_empty() {
                        kind
                    } else {
                        format!("{kind}: {}", e.message)
                    }
                })
                .unwrap_or_else(|_| format!("{status}"));
            return Err(ClientError::Identity(message));
        }

        let parsed: InitiateAuthResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::Decode {
                path: self.endpoint.clone(),
                source: e,
            })?;

        match (parsed.authentication_result, parsed.challenge_name) {
            (Some(result), _) => Ok(StoredSession {
                id_token: result.id_token,
                access_token: result.access_token,
                refresh_token: result.refresh_token,
                saved_at: Utc::now(),
            }),
            (None, Some(challenge)) => Err(ClientError::Identity(format!(
                "challenge {challenge} must be completed in the hosted sign-in page"
            ))),
            (None, None) => Err(ClientError::Identity(
                "response carried neither tokens nor a challenge".into(),
            )),
        }
    }
}
