//! Credential resolution for the developer portal client
//!
//! The portal never issues tokens itself. Signing in happens through an
//! authorization code flow against the identity provider, and the identity
//! library persists the signed-in user as a [`SessionRecord`] under a key
//! derived from the provider settings (see [`IdentityProvider::session_key`]).
//! This crate reads that record back and exposes the bearer credential
//! through the [`CredentialSource`][sources::CredentialSource] trait.
//!
//! ```
//! use devportal_tokens::{sources::CredentialSource, ClientId, IdentityProvider, Realm};
//!
//! # #[tokio::main(flavor = "current_thread")] async fn main() {
//! let provider = IdentityProvider::new(
//!     "https://sso.example.com/".parse().unwrap(),
//!     Realm::from_static("developers"),
//!     ClientId::from_static("dev-portal"),
//! );
//!
//! let source = devportal_tokens::sources::SessionStorageFile::new(
//!     ".session.json".into(),
//!     provider.session_key(),
//! );
//!
//! # async move {
//! match source.resolve_credential().await.unwrap() {
//!     Some(token) => tracing::info!(token = format_args!("{:#?}", token), "signed in"),
//!     None => tracing::info!(login = %provider.authority(), "not signed in"),
//! }
//! # };
//! # }
//! ```
//!
//! Sources are consulted on every request and never cache, so a token
//! refreshed in the background by the identity library is used as soon as
//! it has been written.
//!
//! # Features
//!
//! * `file` (default): Provides [`SessionStorageFile`][sources::SessionStorageFile],
//!   which reads sessions from a local JSON file.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod braids;
mod provider;
mod session;
pub mod sources;

pub use braids::*;
pub use provider::IdentityProvider;
pub use session::{SessionRecord, SessionStatus};
