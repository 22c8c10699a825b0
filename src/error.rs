//! Standard errors used by all functions in the crate.

use crate::{apis::banking::ResponseParameters, signer::SigningError};

/// Error collecting all possible failures of the H2H client.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Network-level failure: connection refused, TLS, timeout, cancellation.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Private key or cryptographic failure while building a request signature.
    ///
    /// Never retried: a key that failed to load once will not load on resubmission.
    #[error("error signing request: {0}")]
    Signing(#[from] SigningError),
    /// The token endpoint rejected the configured credentials or returned
    /// something that is not a token response.
    #[error("authentication failed with HTTP {status}: {body}")]
    Auth {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Raw response body, for logging.
        body: String,
    },
    /// The server kept answering 401 after the token was refreshed.
    #[error("unauthorized after exhausting re-authentication attempts")]
    Unauthorized,
    /// The HTTP exchange completed, but the response envelope does not carry
    /// the payload expected for the operation.
    #[error("{operation} returned an unusable response (HTTP {status})")]
    BadResponse {
        /// Name of the business operation that was dispatched.
        operation: &'static str,
        /// HTTP status returned by the server.
        status: u16,
        /// Decoded status block of the error envelope, when one was present.
        parameters: Option<ResponseParameters>,
        /// Raw response body, for logging.
        body: String,
    },
    /// The server returned 2xx with a body that is not valid JSON for the
    /// expected envelope.
    #[error("malformed {operation} response (HTTP {status}): {source}")]
    Decode {
        /// Name of the business operation that was dispatched.
        operation: &'static str,
        /// HTTP status returned by the server.
        status: u16,
        /// Underlying JSON error.
        source: serde_json::Error,
        /// Raw response body, for logging.
        body: String,
    },
    /// Catch-all variant for unexpected errors.
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<reqwest_middleware::Error> for Error {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => Error::Transport(e),
            reqwest_middleware::Error::Middleware(e) => {
                e.downcast::<Error>().unwrap_or_else(Error::Other)
            }
        }
    }
}

impl From<Error> for reqwest_middleware::Error {
    fn from(e: Error) -> Self {
        reqwest_middleware::Error::Middleware(e.into())
    }
}
