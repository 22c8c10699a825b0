//! Rust client for a bank's host-to-host (H2H) payment API.
//!
//! The gateway authenticates integrations with an OAuth client-credentials
//! grant and verifies an RSA/SHA-256 signature on every business request.
//! This crate wraps both concerns: it acquires tokens, signs and dispatches
//! requests, and transparently re-authenticates once when the server rejects
//! a stale token, so callers only ever see their operation succeed or fail.
//!
//! # Usage
//!
//! ## Prerequisites
//!
//! The bank provisions each integration with a username/password pair, a
//! client id, the per-operation endpoint paths, and registers the public half
//! of an RSA signing key pair.
//!
//! To generate a private key in the PKCS#1 PEM form the gateway expects, run:
//!
//! ```sh
//! openssl genrsa -traditional -out h2h-private-key.pem 2048
//! ```
//!
//! ## Initialize a new `HostlinkClient`
//!
//! Fill a [`Config`](crate::config::Config) with the provisioned settings
//! (any serde format works) and build the client:
//!
//! ```rust,no_run
//! # use hostlink::{Config, HostlinkClient};
//! let config: Config = serde_json::from_str(&std::fs::read_to_string("hostlink.json")?)?;
//! let client = HostlinkClient::new(config)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Inquire a balance
//!
//! There is no explicit login step. The first business call goes out without
//! a token, the gateway rejects it, and the client authenticates and resubmits
//! on its own:
//!
//! ```rust,no_run
//! # use hostlink::{HostlinkClient, Error, apis::banking::GetBalanceRequest};
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! # let client: HostlinkClient = unreachable!();
//! let balance = client
//!     .banking
//!     .get_balance(&GetBalanceRequest {
//!         account_no: "0115476117".to_string(),
//!     })
//!     .await?;
//!
//! println!(
//!     "{} {}",
//!     balance.parameters.account_balance, balance.parameters.account_currency
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Submit a payment
//!
//! ```rust,no_run
//! # use hostlink::{HostlinkClient, Error, apis::banking::InHousePaymentRequestBuilder};
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! # let client: HostlinkClient = unreachable!();
//! let request = InHousePaymentRequestBuilder::default()
//!     .customer_reference_number("20170227000000000201")
//!     .debit_account_no("0115476117")
//!     .credit_account_no("0115471119")
//!     .value_date("20170227")
//!     .value_currency("IDR")
//!     .value_amount(100_500i64)
//!     .remark("Invoice 201")
//!     .build()
//!     .unwrap();
//!
//! let receipt = client.banking.in_house_payment(&request).await?;
//! println!("bank reference: {}", receipt.common.bank_reference);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`](tracing) spans and events only: one start and
//! one end marker per logical operation (carrying the request id, session id
//! and raw JSON) plus a warning for every re-authentication. It never
//! installs a subscriber; wiring the configured log path into one is the
//! application's job. See `demos/get_balance.rs` for a working setup.

#![deny(missing_debug_implementations)]
#![forbid(unsafe_code)]

pub mod apis;
pub(crate) mod authenticator;
pub mod client;
mod common;
pub mod config;
pub mod error;
mod middlewares;
pub mod signer;

pub use client::{HostlinkClient, HostlinkClientBuilder};
pub use config::Config;
pub use error::Error;
pub use middlewares::reauth::ReauthPolicy;
