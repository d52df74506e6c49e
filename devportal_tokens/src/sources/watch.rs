//! A credential source fed by a session publisher
//!
//! This pairs a [`SessionPublisher`], owned by whatever keeps the user signed
//! in (for example, a silent renew loop), with any number of
//! [`SessionWatcher`]s that hand the latest credential to outgoing requests.

use std::{ops, sync::Arc};

use async_trait::async_trait;
use tokio::sync::watch;

use super::{CredentialError, CredentialSource};
use crate::{AccessToken, SessionRecord};

/// Creates a publisher and watcher pair seeded with `initial`
pub fn channel(initial: Option<SessionRecord>) -> (SessionPublisher, SessionWatcher) {
    let (tx, rx) = watch::channel(initial.map(Arc::new));
    (SessionPublisher { tx }, SessionWatcher { watcher: rx })
}

/// Publishes session changes to all watchers
#[derive(Debug)]
pub struct SessionPublisher {
    tx: watch::Sender<Option<Arc<SessionRecord>>>,
}

impl SessionPublisher {
    /// Publishes a new session, replacing the previous one
    pub fn publish(&self, record: SessionRecord) {
        tracing::debug!(session.expires_at = ?record.expires_at(), "publishing session");
        self.tx.send_replace(Some(Arc::new(record)));
    }

    /// Removes the current session
    pub fn sign_out(&self) {
        tracing::debug!("session removed");
        self.tx.send_replace(None);
    }

    /// Creates another watcher of this publisher's session
    pub fn watcher(&self) -> SessionWatcher {
        SessionWatcher {
            watcher: self.tx.subscribe(),
        }
    }
}

/// A watcher that can be used to obtain the most recently published session
///
/// If the publisher is dropped, the last published session remains visible.
#[derive(Clone, Debug)]
pub struct SessionWatcher {
    watcher: watch::Receiver<Option<Arc<SessionRecord>>>,
}

/// An outstanding borrow of the current session
///
/// This borrow should be held for as brief a time as possible, as outstanding
/// borrows will block the publisher.
#[derive(Debug)]
pub struct BorrowedSession<'a> {
    inner: watch::Ref<'a, Option<Arc<SessionRecord>>>,
}

impl<'a> ops::Deref for BorrowedSession<'a> {
    type Target = Option<Arc<SessionRecord>>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl SessionWatcher {
    /// Borrows the current session
    pub fn session(&self) -> BorrowedSession<'_> {
        BorrowedSession {
            inner: self.watcher.borrow(),
        }
    }
}

#[async_trait]
impl CredentialSource for SessionWatcher {
    async fn resolve_credential(&self) -> Result<Option<AccessToken>, CredentialError> {
        let session = self.session();
        Ok(session
            .as_deref()
            .and_then(SessionRecord::credential)
            .map(ToOwned::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &'static str) -> SessionRecord {
        SessionRecord::new(AccessToken::from_static(token))
    }

    #[tokio::test]
    async fn empty_channel_has_no_credential() {
        let (_publisher, watcher) = channel(None);

        assert!(watcher.resolve_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn watcher_sees_published_sessions() {
        let (publisher, watcher) = channel(Some(session("first")));
        let other = publisher.watcher();

        publisher.publish(session("second"));

        let credential = watcher.resolve_credential().await.unwrap();
        assert_eq!(credential.as_deref().map(|t| t.as_str()), Some("second"));
        let credential = other.resolve_credential().await.unwrap();
        assert_eq!(credential.as_deref().map(|t| t.as_str()), Some("second"));
    }

    #[tokio::test]
    async fn sign_out_clears_the_credential() {
        let (publisher, watcher) = channel(Some(session("first")));

        publisher.sign_out();

        assert!(watcher.resolve_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_session_survives_publisher_drop() {
        let (publisher, watcher) = channel(Some(session("first")));

        drop(publisher);

        let credential = watcher.resolve_credential().await.unwrap();
        assert_eq!(credential.as_deref().map(|t| t.as_str()), Some("first"));
    }
}
