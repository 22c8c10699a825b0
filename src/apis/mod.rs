//! Clients for the H2H API groups.

use crate::{authenticator::Authenticator, config::Config, signer::Signer};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt::{Debug, Formatter};

pub mod auth;
pub mod banking;

pub(crate) struct HostlinkClientInner {
    pub(crate) client: ClientWithMiddleware,
    pub(crate) authenticator: Authenticator,
    pub(crate) signer: Signer,
    pub(crate) server: Url,
    pub(crate) config: Config,
}

impl Debug for HostlinkClientInner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostlinkClientInner")
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}
