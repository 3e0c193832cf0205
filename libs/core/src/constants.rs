//! Configuration keys consumed from a bridge's free-form config map.

pub const PROVIDER_URL: &str = "PROVIDER_URL";
pub const PROVIDER_AUTH_TYPE: &str = "PROVIDER_AUTH_TYPE";
pub const PROVIDER_AUTH_TOKEN: &str = "PROVIDER_AUTH_TOKEN";
pub const PROVIDER_ACCOUNT_ID: &str = "PROVIDER_ACCOUNT_ID";
pub const PROVIDER_AUTH_CUSTOM_PREFIX: &str = "PROVIDER_AUTH_CUSTOM_PREFIX";
