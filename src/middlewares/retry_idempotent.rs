use async_trait::async_trait;
use reqwest::{Method, Request, Response};
use reqwest_middleware::{Middleware, Next};
use reqwest_retry::RetryTransientMiddleware;
use retry_policies::{RetryDecision, RetryPolicy};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};
use task_local_extensions::Extensions;

/// Middleware that automatically retries transient failures only on
/// idempotent requests (`GET`, `HEAD`, `OPTIONS`, `TRACE`, `PUT`, `DELETE`;
/// see section 4.2.2 of [RFC 7231](https://datatracker.ietf.org/doc/html/rfc7231#section-4.2.2)).
///
/// The H2H wire protocol has no idempotency keys, so business `POST`s are
/// never replayed at this level; a duplicate payment is worse than a failed
/// one. Whether a rejected token leads to a resubmission is decided one layer
/// up, by the reauth middleware.
pub(crate) struct RetryIdempotentMiddleware {
    inner: RetryTransientMiddleware<DynRetryPolicy>,
}

impl RetryIdempotentMiddleware {
    pub(crate) fn new(retry_policy: DynRetryPolicy) -> Self {
        Self {
            inner: RetryTransientMiddleware::new_with_policy(retry_policy),
        }
    }
}

#[async_trait]
impl Middleware for RetryIdempotentMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let is_idempotent = matches!(
            *req.method(),
            Method::GET
                | Method::HEAD
                | Method::OPTIONS
                | Method::TRACE
                | Method::PUT
                | Method::DELETE
        );

        if is_idempotent {
            self.inner.handle(req, extensions, next).await
        } else {
            next.run(req, extensions).await
        }
    }
}

/// Wrapper type around a retry policy because `dyn RetryPolicy` does not implement `RetryPolicy`.
#[derive(Clone)]
pub struct DynRetryPolicy(pub Arc<dyn RetryPolicy + Send + Sync + 'static>);

impl RetryPolicy for DynRetryPolicy {
    fn should_retry(&self, n_past_retries: u32) -> RetryDecision {
        self.0.should_retry(n_past_retries)
    }
}

impl Debug for DynRetryPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynRetryPolicy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest_middleware::ClientWithMiddleware;
    use reqwest_retry::policies::ExponentialBackoff;
    use wiremock::{matchers::path, Mock, MockServer, ResponseTemplate};

    async fn mock_client_and_server(expects_retry: bool) -> (ClientWithMiddleware, MockServer) {
        // 429 on the first request, 200 on the second
        let mock_server = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(if expects_retry { 1 } else { 0 })
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with(RetryIdempotentMiddleware::new(DynRetryPolicy(Arc::new(
                retry_policy,
            ))))
            .build();

        (client, mock_server)
    }

    #[tokio::test]
    async fn retries_idempotent_methods() {
        for method in [
            Method::GET,
            Method::HEAD,
            Method::OPTIONS,
            Method::TRACE,
            Method::PUT,
            Method::DELETE,
        ] {
            let (client, mock_server) = mock_client_and_server(true).await;

            let res = client
                .request(method, mock_server.uri())
                .send()
                .await
                .unwrap();
            assert!(res.status().is_success());
        }
    }

    #[tokio::test]
    async fn never_replays_a_post() {
        let (client, mock_server) = mock_client_and_server(false).await;

        let res = client
            .request(Method::POST, mock_server.uri())
            .body("{}")
            .send()
            .await
            .unwrap();
        assert!(res.status().is_client_error());
    }
}
