//! Developer portal client
//!
//! Signed-in developers use the portal to obtain an API key, revoke it, and
//! list the routes that accept it. [`PortalClient`] exposes those three
//! operations on top of an authenticated [`Dispatcher`], and normalizes every
//! answer into an [`ApiResponse`]:
//!
//! ```
//! use devportal::{dto, PortalClient};
//! use devportal_reqwest::Dispatcher;
//! use devportal_tokens::{sources::StaticCredentialSource, AccessToken};
//!
//! # #[tokio::main(flavor = "current_thread")] async fn main() {
//! let client = PortalClient::new(Dispatcher::new(
//!     "https://portal.example.com/api".parse().unwrap(),
//!     StaticCredentialSource::new(AccessToken::from_static("token")),
//! ));
//!
//! # async move {
//! let resp = client.get_api_key().await.unwrap();
//! if resp.is_error {
//!     eprintln!("{}", resp.message().unwrap_or("Undefined error message"));
//! } else {
//!     let key: dto::ApiKey = resp.decode().unwrap();
//!     println!("API key: {}", key.api_key);
//! }
//! # };
//! # }
//! ```
//!
//! Errors are reserved for calls that produced no usable answer: no
//! signed-in user, a backend that kept rejecting the credential, a
//! transport failure, or a body that is not JSON. Use
//! [`ApiError::requires_login()`] to decide whether to send the user back
//! through the login flow.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

use devportal_reqwest::{ApiRequest, DispatchError, Dispatcher};
use reqwest::StatusCode;
use thiserror::Error;

pub mod dto;
mod response;

pub use response::ApiResponse;

const API_KEY_PATH: &str = "/apikey";
const ROUTES_PATH: &str = "/routes";

/// A portal operation did not produce a response
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be dispatched
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// Unable to read the response body
    #[error("error reading response body")]
    BodyRead(#[source] reqwest::Error),
    /// The response body is not the expected JSON
    #[error("unexpected response body (status {status})")]
    Decode {
        /// The response status
        status: StatusCode,
        /// The underlying decode error
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether the user must sign in again
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Dispatch(error) if error.requires_login())
    }
}

/// Client for the developer portal backend
#[derive(Clone, Debug)]
pub struct PortalClient {
    dispatcher: Dispatcher,
}

impl PortalClient {
    /// Constructs a new portal client
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Gets the underlying dispatcher
    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Issues an API key for the signed-in user, or returns the existing one
    ///
    /// On success, the body decodes as [`dto::ApiKey`].
    pub async fn get_api_key(&self) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::get(API_KEY_PATH)).await
    }

    /// Revokes the signed-in user's API key
    ///
    /// On success, the body decodes as [`dto::Message`].
    pub async fn delete_api_key(&self) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::delete(API_KEY_PATH)).await
    }

    /// Lists the routes that require key authentication
    ///
    /// On success, the body decodes as [`dto::Routes`].
    pub async fn list_routes(&self) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::get(ROUTES_PATH)).await
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.dispatcher.dispatch(&request).await?;
        let response = ApiResponse::from_response(response).await?;

        if response.is_error {
            tracing::debug!(
                method = %request.method(),
                path = request.path(),
                response.status = response.status.as_u16(),
                response.message = ?response.message(),
                "portal operation failed"
            );
        }

        Ok(response)
    }
}
