//! Session provider.
//!
//! Every privileged call asks the provider for the current session, so a logout or an expired
//! token takes effect on the very next request. Any failure to produce a session (no file,
//! corrupt file, undecodable or expired token) collapses into [`ClientError::NoSession`]; the
//! caller routes the user back to the entry screen. There is no retry.

use crate::store::SessionStore;
use crate::{ClientError, ClientResult};
use chrono::Utc;
use healthtrends_core::{ClientConfig, Screen, Session};

#[derive(Clone, Debug)]
pub struct SessionProvider {
    store: SessionStore,
    token_override: Option<String>,
}

impl SessionProvider {
    pub fn new(store: SessionStore, token_override: Option<String>) -> Self {
        Self {
            store,
            token_override,
        }
    }

    pub fn from_config(cfg: &ClientConfig) -> Self {
        Self::new(
            SessionStore::new(cfg.session_file()),
            cfg.token_override().map(str::to_string),
        )
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The current session, or `NoSession`.
    pub fn current(&self) -> ClientResult<Session> {
        self.resolve().map_err(|e| {
            tracing::debug!("no usable session: {}", e);
            ClientError::NoSession
        })
    }

    /// Where the user should land right now.
    pub fn screen(&self) -> Screen {
        Screen::for_session(self.current().ok().as_ref())
    }

    fn resolve(&self) -> ClientResult<Session> {
        let token = match &self.token_override {
            Some(token) => token.clone(),
            None => self.store.load()?.id_token,
        };

        let session = Session::from_id_token(token)?;
        if session.is_expired(Utc::now()) {
            return Err(ClientError::SessionExpired);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoredSession;
    use crate::test_support::token_for;
    use healthtrends_core::Role;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_no_session() {
        let dir = TempDir::new().unwrap();
        let provider = SessionProvider::new(SessionStore::new(dir.path().join("none.json")), None);

        assert!(matches!(provider.current(), Err(ClientError::NoSession)));
        assert_eq!(provider.screen(), Screen::Entry);
    }

    #[test]
    fn stored_token_is_used() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&StoredSession {
                id_token: token_for("lab-user", &["Labs"]),
                access_token: None,
                refresh_token: None,
                saved_at: Utc::now(),
            })
            .unwrap();

        let provider = SessionProvider::new(store, None);
        let session = provider.current().unwrap();
        assert_eq!(session.role(), Role::Labs);
        assert_eq!(provider.screen(), Screen::Lab);
    }

    #[test]
    fn override_beats_store() {
        let dir = TempDir::new().unwrap();
        let provider = SessionProvider::new(
            SessionStore::new(dir.path().join("none.json")),
            Some(token_for("dr-house", &["Doctors", "Patients"])),
        );

        assert_eq!(provider.current().unwrap().subject_id(), "dr-house");
        assert_eq!(provider.screen(), Screen::Doctor);
    }

    #[test]
    fn expired_or_garbage_token_is_no_session() {
        let dir = TempDir::new().unwrap();
        let expired = crate::test_support::token_with_claims(&serde_json::json!({
            "sub": "x",
            "cognito:groups": ["Admins"],
            "exp": 1,
        }));
        let provider =
            SessionProvider::new(SessionStore::new(dir.path().join("none.json")), Some(expired));
        assert!(matches!(provider.current(), Err(ClientError::NoSession)));

        let garbage =
            SessionProvider::new(SessionStore::new(dir.path().join("none.json")), Some("x".into()));
        assert!(matches!(garbage.current(), Err(ClientError::NoSession)));
    }
}
