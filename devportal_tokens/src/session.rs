use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{AccessToken, AccessTokenRef, IdToken, IdTokenRef, RefreshToken, RefreshTokenRef};

/// A signed-in user's session, as persisted by the identity library
///
/// The serialized form matches the storage string the browser-side OIDC
/// library writes, so records can be moved between the two unchanged.
/// Fields that are not modeled here are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    access_token: AccessToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<IdToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_state: Option<String>,
    #[serde(default)]
    profile: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
}

/// Whether a session's access token is still within its advertised lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// The token has not yet reached `expires_at`
    Active,
    /// The token is past `expires_at`
    Expired,
    /// The record does not carry an expiry
    Unknown,
}

impl SessionRecord {
    /// Constructs a bearer session carrying only an access token
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            id_token: None,
            refresh_token: None,
            token_type: Some("Bearer".to_owned()),
            scope: None,
            session_state: None,
            profile: serde_json::Value::Null,
            expires_at: None,
        }
    }

    /// Sets the unix time, in seconds, at which the access token expires
    pub fn with_expires_at(mut self, expires_at: u64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Parses a record from the identity library's storage string
    pub fn from_storage_string(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Serializes the record into a storage string
    pub fn to_storage_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The bearer credential, if the session holds a non-empty access token
    pub fn credential(&self) -> Option<&AccessTokenRef> {
        if self.access_token.as_str().is_empty() {
            None
        } else {
            Some(&*self.access_token)
        }
    }

    /// Gets the ID token, if present
    #[inline]
    pub fn id_token(&self) -> Option<&IdTokenRef> {
        self.id_token.as_deref()
    }

    /// Gets the refresh token, if present
    #[inline]
    pub fn refresh_token(&self) -> Option<&RefreshTokenRef> {
        self.refresh_token.as_deref()
    }

    /// Gets the granted scopes, space-separated
    #[inline]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Gets the user's profile claims
    #[inline]
    pub fn profile(&self) -> &serde_json::Value {
        &self.profile
    }

    /// Gets the subject claim from the profile, if present
    pub fn subject(&self) -> Option<&str> {
        self.profile.get("sub").and_then(serde_json::Value::as_str)
    }

    /// Gets the unix time at which the access token expires
    #[inline]
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Gets the session status as of now
    pub fn status(&self) -> SessionStatus {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.status_at(now)
    }

    /// Gets the session status as of the given unix time
    pub fn status_at(&self, now: u64) -> SessionStatus {
        match self.expires_at {
            Some(expires_at) if now < expires_at => SessionStatus::Active,
            Some(_) => SessionStatus::Expired,
            None => SessionStatus::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED_USER: &str = r#"{
        "id_token": "id.token.value",
        "session_state": "b3c1a5e2",
        "access_token": "access.token.value",
        "refresh_token": "refresh.token.value",
        "token_type": "Bearer",
        "scope": "openid email profile",
        "profile": { "sub": "4f6c3a9e-1b7d-4f0e-9a51-2d8b7c6e5f40", "email_verified": true },
        "expires_at": 1700000300
    }"#;

    #[test]
    fn parses_identity_library_storage_string() {
        let record = SessionRecord::from_storage_string(STORED_USER).unwrap();

        assert_eq!(
            record.credential().map(|t| t.as_str()),
            Some("access.token.value")
        );
        assert_eq!(record.id_token().map(|t| t.as_str()), Some("id.token.value"));
        assert_eq!(record.scope(), Some("openid email profile"));
        assert_eq!(
            record.subject(),
            Some("4f6c3a9e-1b7d-4f0e-9a51-2d8b7c6e5f40")
        );
        assert_eq!(record.expires_at(), Some(1_700_000_300));
    }

    #[test]
    fn minimal_record_only_needs_an_access_token() {
        let record = SessionRecord::from_storage_string(r#"{"access_token":"abc"}"#).unwrap();

        assert_eq!(record.credential().map(|t| t.as_str()), Some("abc"));
        assert!(record.id_token().is_none());
        assert_eq!(record.status_at(0), SessionStatus::Unknown);
    }

    #[test]
    fn empty_access_token_is_no_credential() {
        let record = SessionRecord::from_storage_string(r#"{"access_token":""}"#).unwrap();

        assert!(record.credential().is_none());
    }

    #[test]
    fn record_without_access_token_is_rejected() {
        assert!(SessionRecord::from_storage_string(r#"{"id_token":"x"}"#).is_err());
    }

    #[test]
    fn status_follows_expiry() {
        let record = SessionRecord::new(AccessToken::from_static("abc")).with_expires_at(100);

        assert_eq!(record.status_at(99), SessionStatus::Active);
        assert_eq!(record.status_at(100), SessionStatus::Expired);
    }

    #[test]
    fn storage_string_survives_a_trip_through_the_store() {
        let record = SessionRecord::new(AccessToken::from_static("abc")).with_expires_at(100);
        let stored = record.to_storage_string().unwrap();
        let restored = SessionRecord::from_storage_string(&stored).unwrap();

        assert_eq!(restored.credential().map(|t| t.as_str()), Some("abc"));
        assert_eq!(restored.expires_at(), Some(100));
    }
}
