//! A fixed in-memory credential source

use crate::sources::{CredentialError, CredentialSource};
use crate::AccessToken;
use async_trait::async_trait;

/// A credential source that always yields the same credential, or none at all
#[derive(Clone, Default, Debug)]
pub struct StaticCredentialSource {
    token: Option<AccessToken>,
}

impl StaticCredentialSource {
    /// Constructs a source that always yields `token`
    pub fn new(token: AccessToken) -> Self {
        Self { token: Some(token) }
    }

    /// Constructs a source with no signed-in user
    pub const fn signed_out() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentialSource {
    async fn resolve_credential(&self) -> Result<Option<AccessToken>, CredentialError> {
        Ok(self.token.clone())
    }
}
