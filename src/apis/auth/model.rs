use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use uuid::Uuid;

/// Credentials used against the bank's token endpoint.
///
/// The H2H gateway only supports the OAuth client-credentials grant, with the
/// username/password pair sent as HTTP Basic auth.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
    /// Client id injected into every business request body.
    pub client_id: String,
}

/// Wrapper for a secret string that makes it harder to accidentally expose
/// secrets and ensures the backing memory is wiped on drop.
///
/// It is a wrapper around a [`secrecy::Secret`](secrecy::Secret).
#[derive(Clone, Debug)]
pub struct Token(Secret<String>);

impl Token {
    /// Wraps a secret string in a new `Token`.
    pub fn new<T: Into<String>>(s: T) -> Self {
        Self(Secret::new(s.into()))
    }

    /// Exposes a reference to the underlying secret string.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl<T> From<T> for Token
where
    T: Into<String>,
{
    fn from(s: T) -> Self {
        Token::new(s)
    }
}

/// Raw body of a successful token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expired_in: i64,
    #[serde(default)]
    pub scope: String,
}

/// An access token paired with the session id minted when it was stored.
///
/// The session id has no protocol meaning; it only correlates log lines to an
/// authentication epoch. The pair is always replaced atomically, so a
/// snapshot never mixes a token with another epoch's session id.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) access_token: Token,
    pub(crate) session_id: Uuid,
}

impl Session {
    /// The access token sent with every business request.
    pub fn access_token(&self) -> &Token {
        &self.access_token
    }

    /// Log-correlation id of the authentication epoch this token belongs to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}
