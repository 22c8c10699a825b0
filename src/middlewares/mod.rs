pub(crate) mod reauth;
pub(crate) mod retry_idempotent;
