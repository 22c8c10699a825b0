//! RSA/SHA-256 signing of business requests.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use openssl::{
    hash::MessageDigest,
    pkey::{PKey, Private},
    rsa::Rsa,
    sign::Signer as OpensslSigner,
};
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

/// Failure modes of [`Signer::sign`]. None of these are retried.
#[derive(thiserror::Error, Debug)]
pub enum SigningError {
    /// The configured PEM file is missing, malformed, or not an RSA private key.
    #[error("invalid private key at {path}: {reason}")]
    InvalidKey {
        /// Path the key was loaded from.
        path: PathBuf,
        /// Why the key was rejected.
        reason: String,
    },
    /// The signing operation itself failed.
    #[error("RSA signing failed: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
}

/// Computes the `signature` field attached to every business request.
///
/// The server verifies a SHA-256 digest over the canonical request fields
/// concatenated in a fixed per-operation order with no delimiter, signed with
/// RSA PKCS#1 v1.5 and encoded as standard base64. Field choice and ordering
/// must match the server's expectation bit-for-bit; they are defined by each
/// request type.
///
/// The private key is read from disk on first use and cached for the lifetime
/// of the process.
pub struct Signer {
    private_key_path: PathBuf,
    key: OnceLock<PKey<Private>>,
}

impl Signer {
    /// Creates a signer backed by the PEM key at `private_key_path`. The file
    /// is not touched until the first [`sign`](Signer::sign) call.
    pub fn new(private_key_path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            key: OnceLock::new(),
        }
    }

    /// Signs `fields` joined in order with no delimiter.
    pub fn sign(&self, fields: &[String]) -> Result<String, SigningError> {
        let key = self.private_key()?;

        let mut signer = OpensslSigner::new(MessageDigest::sha256(), key)?;
        signer.update(fields.concat().as_bytes())?;
        let signature = signer.sign_to_vec()?;

        Ok(BASE64.encode(signature))
    }

    fn private_key(&self) -> Result<&PKey<Private>, SigningError> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }

        let key = load_private_key(&self.private_key_path)?;
        Ok(self.key.get_or_init(|| key))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("private_key_path", &self.private_key_path)
            .finish_non_exhaustive()
    }
}

fn load_private_key(path: &Path) -> Result<PKey<Private>, SigningError> {
    let invalid_key = |reason: String| SigningError::InvalidKey {
        path: path.to_path_buf(),
        reason,
    };

    let pem = std::fs::read(path).map_err(|e| invalid_key(e.to_string()))?;
    let rsa = Rsa::private_key_from_pem(&pem).map_err(|e| invalid_key(e.to_string()))?;

    PKey::from_rsa(rsa).map_err(SigningError::Crypto)
}
