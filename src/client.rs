//! Module containing the main H2H API client.

use crate::{
    apis::{
        auth::{AuthApi, Credentials},
        banking::BankingApi,
        HostlinkClientInner,
    },
    authenticator::Authenticator,
    common::DEFAULT_TIMEOUT,
    config::Config,
    error::Error,
    middlewares::{
        reauth::{ReauthMiddleware, ReauthPolicy},
        retry_idempotent::{DynRetryPolicy, RetryIdempotentMiddleware},
    },
    signer::Signer,
};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_tracing::TracingMiddleware;
use retry_policies::RetryPolicy;
use std::sync::Arc;

/// Client for a bank's host-to-host payment APIs.
///
/// One instance is safe to share across tasks: the only mutable state is the
/// (token, session id) pair, which is guarded internally.
#[derive(Debug, Clone)]
pub struct HostlinkClient {
    /// Authentication API client.
    pub auth: AuthApi,
    /// Banking operations client.
    pub banking: BankingApi,
}

impl HostlinkClient {
    /// Builds a new [`HostlinkClient`] with the default configuration.
    pub fn new(config: Config) -> Result<HostlinkClient, Error> {
        HostlinkClientBuilder::new(config).build()
    }

    /// Returns a new builder to configure a new [`HostlinkClient`].
    pub fn builder(config: Config) -> HostlinkClientBuilder {
        HostlinkClientBuilder::new(config)
    }
}

/// Builder for a [`HostlinkClient`].
#[derive(Debug)]
pub struct HostlinkClientBuilder {
    config: Config,
    client: Option<reqwest::Client>,
    retry_policy: Option<DynRetryPolicy>,
    reauth_policy: ReauthPolicy,
}

impl HostlinkClientBuilder {
    /// Creates a new builder to configure a [`HostlinkClient`].
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: None,
            retry_policy: Some(DynRetryPolicy(Arc::new(
                ExponentialBackoff::builder().build_with_max_retries(3),
            ))),
            reauth_policy: ReauthPolicy::default(),
        }
    }

    /// Consumes the builder and builds a new [`HostlinkClient`].
    pub fn build(self) -> Result<HostlinkClient, Error> {
        let server = Url::parse(&self.config.server).map_err(|e| {
            Error::Other(anyhow::anyhow!(
                "invalid server URL `{}`: {}",
                self.config.server,
                e
            ))
        })?;
        let auth_url = server.join(&self.config.auth_path).map_err(|e| {
            Error::Other(anyhow::anyhow!(
                "invalid auth path `{}`: {}",
                self.config.auth_path,
                e
            ))
        })?;

        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?,
        };

        let credentials = Credentials {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            client_id: self.config.client_id.clone(),
        };

        // The token endpoint gets a raw one-shot client: no token to attach,
        // no transport retries.
        let authenticator = Authenticator::new(
            build_client_with_middleware(client.clone(), None, None),
            auth_url,
            credentials,
        );

        let reauth_middleware = ReauthMiddleware {
            authenticator: authenticator.clone(),
            policy: self.reauth_policy,
        };

        let inner = Arc::new(HostlinkClientInner {
            client: build_client_with_middleware(
                client,
                self.retry_policy,
                Some(reauth_middleware),
            ),
            authenticator,
            signer: Signer::new(self.config.private_key_path.clone()),
            server,
            config: self.config,
        });

        Ok(HostlinkClient {
            auth: AuthApi::new(inner.clone()),
            banking: BankingApi::new(inner),
        })
    }

    /// Sets a specific reqwest [`Client`](reqwest::Client) to use.
    ///
    /// The default client applies a 10 second per-request timeout; a custom
    /// client brings its own timeout and connection pool settings.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets a specific [`RetryPolicy`](retry_policies::RetryPolicy) to use when
    /// retrying transient transport failures of idempotent requests.
    ///
    /// To disable automatic retrying, use `None`. Business `POST`s are never
    /// retried at this level either way.
    pub fn with_retry_policy(
        mut self,
        retry_policy: impl Into<Option<Arc<dyn RetryPolicy + Send + Sync + 'static>>>,
    ) -> Self {
        self.retry_policy = retry_policy.into().map(DynRetryPolicy);
        self
    }

    /// Overrides the bounded re-authentication policy applied to business
    /// calls that come back unauthorized.
    pub fn with_reauth_policy(mut self, reauth_policy: ReauthPolicy) -> Self {
        self.reauth_policy = reauth_policy;
        self
    }
}

fn build_client_with_middleware(
    client: reqwest::Client,
    retry_policy: Option<DynRetryPolicy>,
    reauth_middleware: Option<ReauthMiddleware>,
) -> ClientWithMiddleware {
    let mut builder = reqwest_middleware::ClientBuilder::new(client).with(TracingMiddleware::default());

    // Reauth sits outside the transient retry layer, so a resubmission after
    // re-authentication gets the same transport-level guarantees as the
    // original attempt.
    if let Some(reauth_middleware) = reauth_middleware {
        builder = builder.with(reauth_middleware);
    }

    if let Some(retry_policy) = retry_policy {
        builder = builder.with(RetryIdempotentMiddleware::new(retry_policy));
    }

    builder.build()
}
