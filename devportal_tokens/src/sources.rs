//! Credential sources

use std::{io, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::AccessToken;

#[cfg(feature = "file")]
pub mod file;
pub mod in_memory;
pub mod watch;

#[cfg(feature = "file")]
pub use file::SessionStorageFile;
pub use in_memory::StaticCredentialSource;
pub use watch::{SessionPublisher, SessionWatcher};

/// A place the current user's bearer credential can be read from
///
/// Sources are read fresh on every call; an `Ok(None)` means nobody is
/// signed in.
#[async_trait]
pub trait CredentialSource: std::fmt::Debug + Send + Sync {
    /// Reads the current credential, if there is one
    async fn resolve_credential(&self) -> Result<Option<AccessToken>, CredentialError>;
}

#[async_trait]
impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    async fn resolve_credential(&self) -> Result<Option<AccessToken>, CredentialError> {
        (**self).resolve_credential().await
    }
}

/// An error while reading persisted session state
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The session store exists but could not be read
    #[error("unable to read session store")]
    Read(#[from] io::Error),
    /// The session store or the stored session is not in the expected format
    #[error("malformed session record")]
    Malformed(#[from] serde_json::Error),
}
