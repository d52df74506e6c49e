//! Errors raised while dispatching a request

use devportal_tokens::sources::CredentialError;
use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// A request could not be completed
///
/// HTTP error statuses other than `401 Unauthorized` are not errors at this
/// layer; those responses are returned to the caller as they are.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No credential is available, so the user needs to sign in
    #[error("user is not logged in")]
    Unauthenticated,
    /// Every attempt was rejected as unauthorized
    #[error("unauthorized after {attempts} attempts")]
    RetriesExhausted {
        /// The number of attempts made
        attempts: u32,
    },
    /// The credential store could not be read
    #[error("unable to resolve credential")]
    Credential(#[from] CredentialError),
    /// The credential contains bytes that cannot be sent in a header
    #[error("credential cannot be sent as an authorization header")]
    MalformedCredential(#[source] InvalidHeaderValue),
    /// The request path does not produce a valid URL
    #[error("'{path}' does not form a valid request URL")]
    InvalidUrl {
        /// The request path
        path: String,
        /// The underlying parse error
        source: url::ParseError,
    },
    /// Unable to send the request or receive a response
    #[error("error sending request")]
    Transport(#[from] reqwest_middleware::Error),
}

impl DispatchError {
    /// Whether the user must sign in again before retrying
    ///
    /// This is the case when no credential exists, or when the backend has
    /// kept rejecting the credential that does.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::RetriesExhausted { .. }
        )
    }
}
