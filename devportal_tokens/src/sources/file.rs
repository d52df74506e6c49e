//! A credential source backed by a session storage file

use std::{collections::HashMap, io, path::PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::{CredentialError, CredentialSource};
use crate::{AccessToken, SessionKey, SessionRecord};

/// A credential source that reads the identity library's session storage from a local file
///
/// The file holds a JSON object mapping session keys to stored users, where
/// each user is either the library's storage string or the equivalent JSON
/// object. The file is re-read on every lookup so that a refresh performed
/// by the identity library is picked up by the next request.
#[derive(Debug)]
pub struct SessionStorageFile {
    path: PathBuf,
    key: SessionKey,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSession {
    Encoded(String),
    Decoded(Box<SessionRecord>),
}

impl SessionStorageFile {
    /// Constructs a new session storage file source for the session stored under `key`
    pub fn new(path: PathBuf, key: SessionKey) -> Self {
        Self { path, key }
    }

    /// Reads the stored session, if one exists
    pub async fn read_session(&self) -> Result<Option<SessionRecord>, CredentialError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::trace!(path = %self.path.display(), "no session storage file");
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };

        let mut storage: HashMap<SessionKey, StoredSession> = serde_json::from_str(&data)?;

        let record = match storage.remove(&self.key) {
            Some(StoredSession::Encoded(encoded)) => SessionRecord::from_storage_string(&encoded)?,
            Some(StoredSession::Decoded(record)) => *record,
            None => {
                tracing::trace!(key = %self.key, "no session stored under key");
                return Ok(None);
            }
        };

        Ok(Some(record))
    }
}

#[async_trait]
impl CredentialSource for SessionStorageFile {
    async fn resolve_credential(&self) -> Result<Option<AccessToken>, CredentialError> {
        let Some(record) = self.read_session().await? else {
            return Ok(None);
        };

        let credential = record.credential().map(ToOwned::to_owned);

        tracing::trace!(
            found = credential.is_some(),
            session.status = ?record.status(),
            session.expires_at = ?record.expires_at(),
            "read session from storage file"
        );

        Ok(credential)
    }
}
