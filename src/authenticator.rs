use crate::{
    apis::auth::{Credentials, Session, Token, TokenResponse},
    common::{CLIENT_CREDENTIALS_BODY, FORM_CONTENT_TYPE},
    error::Error,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Url,
};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::ExposeSecret;
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

/// Shared (token, session id) pair.
///
/// The pair is replaced under a single critical section: a fresh session id
/// is minted for every token replacement, and readers always get a snapshot
/// of one complete pair. The lock itself is never exposed.
#[derive(Clone, Debug, Default)]
pub(crate) struct TokenStore {
    inner: Arc<Mutex<Option<Session>>>,
}

impl TokenStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored token, minting a new session id in the same
    /// critical section. Returns the stored pair.
    pub(crate) fn set(&self, access_token: Token) -> Session {
        let session = Session {
            access_token,
            session_id: Uuid::new_v4(),
        };
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        session
    }

    /// Snapshot of the current pair, `None` until the first authentication.
    pub(crate) fn get(&self) -> Option<Session> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Performs the client-credentials round-trip against the token endpoint and
/// owns the token store updated by it.
#[derive(Clone)]
pub(crate) struct Authenticator {
    client: ClientWithMiddleware,
    auth_url: Url,
    credentials: Credentials,
    store: TokenStore,
}

impl Authenticator {
    /// `client` must be a raw client: no reauth middleware (the token
    /// endpoint does not take a token) and no transport retries.
    pub(crate) fn new(
        client: ClientWithMiddleware,
        auth_url: Url,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            auth_url,
            credentials,
            store: TokenStore::new(),
        }
    }

    pub(crate) fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// Snapshot of the current (token, session id) pair.
    pub(crate) fn session(&self) -> Option<Session> {
        self.store.get()
    }

    /// One-shot POST of the client-credentials grant. On success the store is
    /// updated and a fresh session id is minted.
    ///
    /// Token validity is discovered reactively by the server rejecting a
    /// business call; nothing here tracks expiry.
    #[tracing::instrument(name = "Authenticate", level = "debug", skip(self))]
    pub(crate) async fn authenticate(&self) -> Result<Session, Error> {
        let basic = BASE64.encode(format!(
            "{}:{}",
            self.credentials.username,
            self.credentials.password.expose_secret()
        ));

        let response = self
            .client
            .post(self.auth_url.clone())
            .header(AUTHORIZATION, format!("Basic {}", basic))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(CLIENT_CREDENTIALS_BODY)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|_| Error::Auth {
            status: status.as_u16(),
            body,
        })?;

        let session = self.store.set(Token::new(token.access_token));
        tracing::info!(
            session_id = %session.session_id,
            token_type = %token.token_type,
            scope = %token.scope,
            "obtained new access token"
        );

        Ok(session)
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("auth_url", &self.auth_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
