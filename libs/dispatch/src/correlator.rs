use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use tracing::{Instrument, debug, info};

use smsgw_core::{GatewayError, MessageId, SharedMessageStore, StatusChange};
use smsgw_providers::ProviderRegistry;

/// Correlates inbound delivery reports with the messages they concern.
///
/// Providers deliver reports at-least-once and out of order; the correlator
/// is idempotent (re-applying an identical status is a no-op) and monotonic
/// (a terminal status is never overwritten by a less final one). Reports for
/// different messages are independent and may be processed concurrently.
pub struct CallbackCorrelator {
    messages: SharedMessageStore,
    providers: Arc<ProviderRegistry>,
}

impl CallbackCorrelator {
    pub fn new(messages: SharedMessageStore, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            messages,
            providers,
        }
    }

    /// Applies one delivery report. The payload is untrusted input; the
    /// referenced message must exist before any state is mutated. A message
    /// still `Pending` is fine — its send may have timed out while the
    /// provider kept the message.
    pub async fn correlate(
        &self,
        provider_name: &str,
        message_id: MessageId,
        payload: &Value,
    ) -> Result<StatusChange, GatewayError> {
        let span = tracing::info_span!("callback", provider = provider_name, %message_id);
        async move {
            let provider = self.providers.get(provider_name)?;

            if self.messages.get(message_id).await.is_none() {
                counter!(
                    "sms_callback_total",
                    "provider" => provider_name.to_string(),
                    "outcome" => "unknown_message"
                )
                .increment(1);
                return Err(GatewayError::correlation(message_id, "unknown message id"));
            }

            let native = provider.parse_report(message_id, payload)?;
            let status = provider.translate(&native);
            let change = self.messages.apply_status(message_id, status).await?;

            if change.changed() {
                info!(%native, status = %change.current, "delivery report applied");
            } else {
                debug!(%native, status = %change.current, "duplicate or stale delivery report ignored");
            }
            counter!(
                "sms_callback_total",
                "provider" => provider_name.to_string(),
                "outcome" => "applied"
            )
            .increment(1);

            Ok(change)
        }
        .instrument(span)
        .await
    }
}
