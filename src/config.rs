//! Static configuration consumed at client construction time.

use crate::apis::banking::Operation;
use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;

/// Connection, path and credential settings for one H2H integration.
///
/// The embedding application loads this from wherever it keeps secrets (the
/// fields deserialize from any serde format) and hands it to
/// [`HostlinkClientBuilder`](crate::client::HostlinkClientBuilder), which
/// consumes it read-only.
///
/// All `*_path` fields are joined onto `server` and must start with `/`.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Basic-auth username for the token endpoint.
    pub username: String,
    /// Basic-auth password for the token endpoint.
    pub password: Secret<String>,
    /// Client id injected into every business request body.
    pub client_id: String,
    /// Base URL of the bank's H2H gateway, e.g. `https://h2h.bank.example:8065`.
    pub server: String,
    pub auth_path: String,
    pub balance_path: String,
    pub in_house_inquiry_path: String,
    pub inter_bank_inquiry_path: String,
    pub in_house_payment_path: String,
    pub inter_bank_payment_path: String,
    pub payment_status_path: String,
    /// PEM-encoded PKCS#1 RSA private key used to sign business requests.
    pub private_key_path: PathBuf,
    /// Destination for the application's structured log output.
    ///
    /// The library itself only emits `tracing` events; wiring this path into
    /// a subscriber is the embedding application's concern.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

impl Config {
    pub(crate) fn operation_path(&self, operation: Operation) -> &str {
        match operation {
            Operation::Balance => &self.balance_path,
            Operation::InHouseInquiry => &self.in_house_inquiry_path,
            Operation::InterBankInquiry => &self.inter_bank_inquiry_path,
            Operation::InHousePayment => &self.in_house_payment_path,
            Operation::InterBankPayment => &self.inter_bank_payment_path,
            Operation::PaymentStatus => &self.payment_status_path,
        }
    }
}
