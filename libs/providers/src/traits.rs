use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use smsgw_core::{BridgeConfig, DeliveryStatus, GatewayError, MessageId, OutboundMessage};
use smsgw_translator::NativeStatus;

use crate::client::SmsClient;

/// What a provider returns when it accepts a message.
///
/// The status here is the only synchronous status a caller is guaranteed;
/// it means the provider accepted the message, not that it was delivered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendOutcome {
    /// Provider-assigned message id, recorded as the external id.
    pub external_id: String,
    /// Canonical translation of the provider's immediate status.
    pub status: DeliveryStatus,
    /// Raw provider response body kept for diagnostics.
    #[serde(default)]
    pub raw: Value,
}

/// Composes the full destination address from the bridge's dialing code and
/// the message's local number. No separators, no validation; both inputs
/// were validated upstream.
///
/// ```
/// assert_eq!(smsgw_providers::compose_destination("+1", "5551234"), "+15551234");
/// ```
pub fn compose_destination(country_code: &str, mobile_number: &str) -> String {
    format!("{country_code}{mobile_number}")
}

/// Contract implemented once per external delivery service.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Stable provider name; also the path segment in callback URLs.
    fn name(&self) -> &'static str;

    /// Sends the message through the provider and translates its immediate
    /// response. The callback URL is registered with the provider so it can
    /// push delivery reports for this message id later.
    async fn send(
        &self,
        client: &SmsClient,
        bridge: &BridgeConfig,
        message: &OutboundMessage,
        callback_url: &str,
    ) -> Result<SendOutcome, GatewayError>;

    /// Extracts the provider-native status code from an inbound delivery
    /// report. The payload is untrusted input; a malformed body is a
    /// correlation error, never a panic.
    fn parse_report(
        &self,
        message_id: MessageId,
        payload: &Value,
    ) -> Result<NativeStatus, GatewayError>;

    /// Translates a native status into the canonical set. Total.
    fn translate(&self, native: &NativeStatus) -> DeliveryStatus;

    /// Pull-style status reconciliation for providers that support it.
    /// Push-only providers keep the default no-op.
    async fn update_status_by_message_id(
        &self,
        _client: &SmsClient,
        _bridge: &BridgeConfig,
        _external_id: &str,
    ) -> Result<Option<NativeStatus>, GatewayError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_concatenates_without_separators() {
        assert_eq!(compose_destination("+1", "5551234"), "+15551234");
        assert_eq!(compose_destination("+254", "712345678"), "+254712345678");
    }
}
