use thiserror::Error;

use crate::types::{BridgeId, CountryId, MessageId, TenantId};

/// Error taxonomy of the gateway core.
///
/// Every failure is reported synchronously to the immediate caller; nothing
/// is swallowed inside the core components. The HTTP layer maps variants to
/// response codes at the boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No bridge configured for the (tenant, country) pair. Not retried.
    #[error("no sms bridge configured for tenant {tenant} and country {country}")]
    BridgeNotFound {
        tenant: TenantId,
        country: CountryId,
    },

    /// A specific bridge id does not exist for the tenant.
    #[error("sms bridge {bridge} not found for tenant {tenant}")]
    BridgeIdNotFound { tenant: TenantId, bridge: BridgeId },

    /// A bridge names a provider no adapter is registered for.
    #[error("provider `{0}` is not registered")]
    ProviderNotFound(String),

    /// Bridge configuration names an auth type the client factory does not
    /// recognize. Fatal at client-creation time.
    #[error("unsupported provider auth type `{0}`")]
    UnsupportedAuthType(String),

    /// A configuration key required by the selected provider/auth type is
    /// missing from the bridge config map.
    #[error("provider `{provider}` requires configuration key `{key}`")]
    MissingConfig {
        provider: String,
        key: &'static str,
    },

    /// Network, auth, or provider-reported failure during send. The caller
    /// decides on retries; the core never retries automatically.
    #[error("provider `{provider}` dispatch failed: {detail}")]
    ProviderDispatch { provider: String, detail: String },

    /// Inbound notification referenced an unknown message or carried a
    /// malformed native status.
    #[error("callback for message {message_id} could not be correlated: {detail}")]
    CallbackCorrelation {
        message_id: MessageId,
        detail: String,
    },
}

impl GatewayError {
    /// Builds a [`GatewayError::ProviderDispatch`] from any displayable
    /// provider diagnostic.
    pub fn dispatch(provider: impl Into<String>, detail: impl ToString) -> Self {
        GatewayError::ProviderDispatch {
            provider: provider.into(),
            detail: detail.to_string(),
        }
    }

    /// Builds a [`GatewayError::CallbackCorrelation`].
    pub fn correlation(message_id: MessageId, detail: impl ToString) -> Self {
        GatewayError::CallbackCorrelation {
            message_id,
            detail: detail.to_string(),
        }
    }
}
