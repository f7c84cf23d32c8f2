//! In-process stub of the HealthTrends backends for tests.
//!
//! The stub answers every request through a single responder closure and records what it
//! received, so tests can assert both on the client's state and on the exact requests sent.

use crate::api::HealthTrendsClient;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Json,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use healthtrends_core::ClientConfig;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Far-future expiry (2100-01-01).
const FAR_FUTURE_EXP: i64 = 4_102_444_800;

pub fn token_with_claims(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn token_for(username: &str, groups: &[&str]) -> String {
    token_with_claims(&json!({
        "sub": format!("sub-{username}"),
        "cognito:username": username,
        "email": format!("{username}@example.com"),
        "cognito:groups": groups,
        "exp": FAR_FUTURE_EXP,
    }))
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Responder = dyn Fn(&Recorded) -> (StatusCode, Value) + Send + Sync;

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Arc<Responder>,
}

pub struct StubBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubBackend {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Recorded) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            requests: requests.clone(),
            responder: Arc::new(responder),
        };

        let app = Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    /// A client pointed at this stub (read service at `/`, ingestion at `/ingest`).
    pub fn client(&self, token: &str) -> HealthTrendsClient {
        let cfg = ClientConfig::new(
            &self.base_url,
            &format!("{}/ingest", self.base_url),
            std::env::temp_dir().join("healthtrends-test-no-session.json"),
            Duration::ZERO,
        )
        .unwrap()
        .with_token_override(Some(token.to_string()));

        HealthTrendsClient::new(&cfg).unwrap()
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, value) = (state.responder)(&recorded);
    state.requests.lock().unwrap().push(recorded);
    (status, Json(value))
}
