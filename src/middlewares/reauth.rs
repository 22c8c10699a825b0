use crate::{
    apis::auth::Session, authenticator::Authenticator, common::ACCESS_TOKEN_PARAM, error::Error,
};
use async_trait::async_trait;
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use std::collections::HashSet;
use task_local_extensions::Extensions;

/// Bounded retry policy for business responses that indicate a stale token.
///
/// `max_attempts` counts HTTP submissions of the same logical request,
/// including the first. The default (2 attempts, retry on 401) allows at most
/// one re-authentication and one resubmission per call, so a broken token
/// endpoint can never cause a reauth loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReauthPolicy {
    pub max_attempts: u32,
    pub retryable_status_codes: HashSet<u16>,
}

impl ReauthPolicy {
    /// Returns `true` if a request that came back with `status` on the given
    /// 1-based `attempt` should be resubmitted after re-authentication.
    pub fn should_retry(&self, status: StatusCode, attempt: u32) -> bool {
        attempt < self.max_attempts && self.retryable_status_codes.contains(&status.as_u16())
    }
}

impl Default for ReauthPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retryable_status_codes: HashSet::from([StatusCode::UNAUTHORIZED.as_u16()]),
        }
    }
}

/// Middleware coupling the authentication lifecycle to business dispatch.
///
/// Every outgoing request gets the current access token appended as the
/// `access_token` query parameter (empty until the first authentication).
/// When the server answers with a retryable status, the middleware
/// re-authenticates through the [`Authenticator`], which replaces the stored
/// (token, session id) pair, and resubmits the original request with the
/// fresh token. A retryable status on the final attempt surfaces as
/// [`Error::Unauthorized`].
///
/// Transport errors are propagated immediately: connection-level retries are
/// the concern of the inner retry middleware, and cancelling the caller's
/// future aborts the in-flight attempt without further submissions.
///
/// Concurrent calls failing at the same time each trigger their own reauth
/// round-trip. The token store serializes the writes and the last writer
/// wins, so this is redundant traffic rather than a correctness problem.
pub(crate) struct ReauthMiddleware {
    pub(crate) authenticator: Authenticator,
    pub(crate) policy: ReauthPolicy,
}

#[async_trait]
impl Middleware for ReauthMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            // The original request stays pristine; each attempt gets its own
            // clone carrying the token of the moment.
            let mut attempt_req = req.try_clone().ok_or_else(|| {
                Error::Other(anyhow::anyhow!("cannot resubmit a streaming request body"))
            })?;

            let session = self.authenticator.session();
            attempt_req
                .url_mut()
                .query_pairs_mut()
                .append_pair(
                    ACCESS_TOKEN_PARAM,
                    session
                        .as_ref()
                        .map(|s| s.access_token().expose_secret())
                        .unwrap_or_default(),
                );

            let response = next.clone().run(attempt_req, extensions).await?;
            let status = response.status();

            if self.policy.should_retry(status, attempt) {
                tracing::warn!(
                    status = status.as_u16(),
                    attempt,
                    session_id = ?session.as_ref().map(Session::session_id),
                    "token rejected by business endpoint, re-authenticating"
                );
                self.authenticator.authenticate().await?;
                continue;
            }

            if self.policy.retryable_status_codes.contains(&status.as_u16()) {
                return Err(Error::Unauthorized.into());
            }

            return Ok(response);
        }
    }
}
