use std::time::Duration;

// Wire constants
pub(crate) static ACCESS_TOKEN_PARAM: &str = "access_token";
pub(crate) static CLIENT_CREDENTIALS_BODY: &str = "grant_type=client_credentials";
pub(crate) static FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub(crate) static JSON_CONTENT_TYPE: &str = "application/json";

// Per-request timeout applied to the default HTTP client
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
