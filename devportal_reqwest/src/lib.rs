//! Authenticated request dispatch for the developer portal backend
//!
//! A [`Dispatcher`] sends each [`ApiRequest`] to the backend with the
//! current user's bearer credential attached. The credential is read from a
//! [`CredentialSource`] before every attempt. If the backend answers
//! `401 Unauthorized`, the request is retried with exponential backoff, which
//! gives a background token refresh a chance to land before the request
//! fails. See [`RetryPolicy`] for the schedule.
//!
//! ```
//! use devportal_reqwest::{ApiRequest, Dispatcher};
//! use devportal_tokens::{sources::StaticCredentialSource, AccessToken};
//!
//! # #[tokio::main(flavor = "current_thread")] async fn main() {
//! let dispatcher = Dispatcher::new(
//!     "https://portal.example.com/api".parse().unwrap(),
//!     StaticCredentialSource::new(AccessToken::from_static("token")),
//! );
//!
//! let req = ApiRequest::get("/apikey");
//! # async move {
//! let response = dispatcher.dispatch(&req).await.unwrap();
//! # };
//! # }
//! ```
//!
//! Responses with statuses other than `401` are handed back untouched;
//! deciding what a `404` or `500` means is left to the caller. Failing to
//! find a credential, running out of retries, and transport failures are
//! reported as distinct [`DispatchError`] variants so callers can tell when
//! the user has to sign in again.
//!
//! The dispatcher sends through a [`ClientWithMiddleware`], so any
//! middleware stack can be supplied with [`Dispatcher::with_client()`].

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

use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use devportal_tokens::{sources::CredentialSource, AccessTokenRef};
use reqwest::{header, Response, StatusCode};
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

pub mod backoff;
mod error;
mod request;

pub use backoff::RetryPolicy;
pub use error::DispatchError;
pub use request::ApiRequest;

/// Sends authenticated requests to the backend API
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: ClientWithMiddleware,
    base_url: Url,
    credentials: Arc<dyn CredentialSource>,
    retry_policy: RetryPolicy,
}

impl Dispatcher {
    /// Constructs a new dispatcher for the API at `base_url`
    ///
    /// Uses a default client and the default [`RetryPolicy`].
    pub fn new(base_url: Url, credentials: impl CredentialSource + 'static) -> Self {
        Self {
            client: ClientWithMiddleware::from(reqwest::Client::default()),
            base_url,
            credentials: Arc::new(credentials),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replaces the client used to send requests
    pub fn with_client(mut self, client: impl Into<ClientWithMiddleware>) -> Self {
        self.client = client.into();
        self
    }

    /// Replaces the retry policy
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Gets the base URL requests are sent to
    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Gets the retry policy
    #[inline]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Resolves the full URL for a request path
    ///
    /// The path is appended to the base URL; an empty path addresses the base
    /// URL itself.
    pub fn url_for(&self, path: &str) -> Result<Url, DispatchError> {
        if path.is_empty() {
            return Ok(self.base_url.clone());
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(|source| DispatchError::InvalidUrl {
            path: path.to_owned(),
            source,
        })
    }

    /// Sends a request, retrying while the backend rejects the credential
    ///
    /// The credential is resolved again before every attempt, and the call
    /// fails with [`DispatchError::Unauthenticated`] without touching the
    /// network if none is available. Any response other than
    /// `401 Unauthorized` is returned as is.
    pub async fn dispatch(&self, request: &ApiRequest) -> Result<Response, DispatchError> {
        let url = self.url_for(request.path())?;
        let mut backoff = self.retry_policy.handler();

        loop {
            let token = self
                .credentials
                .resolve_credential()
                .await?
                .ok_or(DispatchError::Unauthenticated)?;

            tracing::debug!(
                method = %request.method(),
                url = %url,
                attempt = backoff.attempt(),
                "dispatching request"
            );

            let mut builder = self
                .client
                .request(request.method().clone(), url.clone())
                .headers(default_headers(&token)?);
            builder = builder.headers(request.headers().clone());
            if let Some(body) = request.body() {
                builder = builder.json(body);
            }

            let response = builder.send().await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                tracing::debug!(
                    response.status = response.status().as_u16(),
                    attempts = backoff.attempts(),
                    "received response"
                );
                return Ok(response);
            }

            match backoff.unauthorized() {
                Some(delay) => {
                    tracing::warn!(
                        url = %url,
                        attempt = backoff.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "request unauthorized, will retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(
                        url = %url,
                        attempts = backoff.attempts(),
                        "request unauthorized, giving up"
                    );
                    return Err(DispatchError::RetriesExhausted {
                        attempts: backoff.attempts(),
                    });
                }
            }
        }
    }
}

fn default_headers(token: &AccessTokenRef) -> Result<header::HeaderMap, DispatchError> {
    tracing::trace!(
        token = format_args!("{:#?}", token),
        "obtained access token"
    );

    let mut headers = header::HeaderMap::with_capacity(3);
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(header::AUTHORIZATION, bearer_header(token)?);
    Ok(headers)
}

fn bearer_header(token: &AccessTokenRef) -> Result<header::HeaderValue, DispatchError> {
    let mut header_value = BytesMut::with_capacity(token.as_str().len() + 7);
    header_value.put_slice(b"Bearer ");
    header_value.put_slice(token.as_str().as_bytes());
    let mut value = header::HeaderValue::from_maybe_shared(header_value.freeze())
        .map_err(DispatchError::MalformedCredential)?;
    value.set_sensitive(true);
    Ok(value)
}
