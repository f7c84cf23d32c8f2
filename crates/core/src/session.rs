//! Identity-token session model.
//!
//! The identity provider issues a JWT id token. The client never verifies its signature (the
//! backend does that on every call); it only reads the payload to learn who the user is, which
//! groups they belong to and when the token expires.

use crate::role::Role;
use crate::{CoreError, CoreResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Claims read from an id token payload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    #[serde(rename = "cognito:username", alias = "username", default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "cognito:groups", default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// A decoded identity session: the raw bearer token plus its claims.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    id_token: String,
    claims: IdentityClaims,
}

impl Session {
    /// Decode the payload segment of `id_token`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedToken` if the token is not three dot-separated segments, or a decode
    /// error if the payload is not base64url-encoded JSON claims.
    pub fn from_id_token(id_token: impl Into<String>) -> CoreResult<Self> {
        let id_token = id_token.into().trim().to_string();
        let mut parts = id_token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CoreError::MalformedToken);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(CoreError::TokenPayloadDecode)?;
        let claims: IdentityClaims =
            serde_json::from_slice(&bytes).map_err(CoreError::TokenClaims)?;

        Ok(Self { id_token, claims })
    }

    /// The raw token to attach as a bearer credential.
    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    pub fn role(&self) -> Role {
        Role::from_groups(&self.claims.groups)
    }

    /// The identifier the backend files this user's results under: the username, or `sub`.
    pub fn subject_id(&self) -> &str {
        self.claims
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.claims.sub)
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.email.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Tokens without an `exp` claim are treated as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(true, |exp| now >= exp)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    /// Build an unsigned token carrying `claims` as its payload.
    pub fn token_with_claims(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::token_with_claims;
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_cognito_id_token_claims() {
        let token = token_with_claims(&json!({
            "sub": "8c1f0e2a",
            "cognito:username": "ana",
            "email": "ana@example.com",
            "cognito:groups": ["Patients", "Doctors"],
            "exp": 4_102_444_800i64,
        }));

        let session = Session::from_id_token(token.clone()).unwrap();
        assert_eq!(session.id_token(), token);
        assert_eq!(session.role(), Role::Doctors);
        assert_eq!(session.subject_id(), "ana");
        assert_eq!(session.email(), Some("ana@example.com"));
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn subject_falls_back_to_sub() {
        let token = token_with_claims(&json!({ "sub": "8c1f0e2a", "exp": 1 }));
        let session = Session::from_id_token(token).unwrap();
        assert_eq!(session.subject_id(), "8c1f0e2a");
        assert_eq!(session.role(), Role::Unknown);
    }

    #[test]
    fn expired_and_expiryless_tokens_are_expired() {
        let expired = Session::from_id_token(token_with_claims(&json!({ "sub": "x", "exp": 10 })))
            .unwrap();
        assert!(expired.is_expired(Utc::now()));

        let no_exp = Session::from_id_token(token_with_claims(&json!({ "sub": "x" }))).unwrap();
        assert!(no_exp.is_expired(Utc::now()));
    }

    #[test]
    fn rejects_non_jwt() {
        assert!(matches!(
            Session::from_id_token("not-a-token"),
            Err(CoreError::MalformedToken)
        ));
        assert!(matches!(
            Session::from_id_token("a.b.c.d"),
            Err(CoreError::MalformedToken)
        ));
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(matches!(
            Session::from_id_token("aGVhZA.!!!.c2ln"),
            Err(CoreError::TokenPayloadDecode(_))
        ));
        let not_json = URL_SAFE_NO_PAD.encode("plain text");
        assert!(matches!(
            Session::from_id_token(format!("aGVhZA.{not_json}.c2ln")),
            Err(CoreError::TokenClaims(_))
        ));
    }
}
