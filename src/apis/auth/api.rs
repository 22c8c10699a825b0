use crate::{
    apis::{auth::Session, HostlinkClientInner},
    Error,
};
use std::sync::Arc;

/// Authentication API client.
#[derive(Clone, Debug)]
pub struct AuthApi {
    inner: Arc<HostlinkClientInner>,
}

impl AuthApi {
    pub(crate) fn new(inner: Arc<HostlinkClientInner>) -> Self {
        Self { inner }
    }

    /// Runs the client-credentials flow now, replacing the stored token and
    /// minting a new session id.
    ///
    /// Calling this up front is optional: a business call dispatched without
    /// a token is rejected by the server and re-authenticated transparently.
    pub async fn authenticate(&self) -> Result<Session, Error> {
        self.inner.authenticator.authenticate().await
    }

    /// Snapshot of the current (token, session id) pair, `None` until the
    /// first successful authentication.
    pub fn current_session(&self) -> Option<Session> {
        self.inner.authenticator.session()
    }
}
