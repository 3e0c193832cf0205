use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, warn};

use smsgw_core::{
    CountryId, DeliveryStatus, GatewayError, MessageId, SharedBridgeStore, SharedMessageStore,
    TenantId,
};
use smsgw_providers::{ProviderClientCache, ProviderRegistry};

use crate::host::CallbackHost;

/// What a caller submits for dispatch. Field validation happened upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Local number without the country prefix.
    pub mobile_number: String,
    /// Message body text.
    pub body: String,
}

/// What the caller gets back once a provider accepted the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub message_id: MessageId,
    pub external_id: String,
    /// Canonical status after the synchronous exchange. Acceptance, not
    /// delivery; final state arrives via callbacks.
    pub status: DeliveryStatus,
}

/// Orchestrates the outbound path: bridge resolution, client reuse, provider
/// dispatch, and state recording.
pub struct MessageDispatcher {
    bridges: SharedBridgeStore,
    messages: SharedMessageStore,
    providers: Arc<ProviderRegistry>,
    clients: ProviderClientCache,
    callback_host: CallbackHost,
    send_timeout: Duration,
}

impl MessageDispatcher {
    pub fn new(
        bridges: SharedBridgeStore,
        messages: SharedMessageStore,
        providers: Arc<ProviderRegistry>,
        clients: ProviderClientCache,
        callback_host: CallbackHost,
        send_timeout: Duration,
    ) -> Self {
        Self {
            bridges,
            messages,
            providers,
            clients,
            callback_host,
            send_timeout,
        }
    }

    /// Sends one message through the bridge configured for the tenant and
    /// country. Fails fast on missing bridges and configuration errors;
    /// provider failures are classified and propagated, never retried here.
    pub async fn dispatch(
        &self,
        tenant: TenantId,
        country: CountryId,
        request: DispatchRequest,
    ) -> Result<DispatchReceipt, GatewayError> {
        let span = tracing::info_span!("dispatch", %tenant, %country, provider = tracing::field::Empty);
        async move {
            // Bridge resolution comes first: a missing bridge must not touch
            // the client cache.
            let bridge = self.bridges.resolve(tenant, country).await?;
            tracing::Span::current().record("provider", bridge.provider.as_str());
            let provider = self.providers.get(&bridge.provider)?;

            // The message id exists before the send so delivery reports can
            // be correlated even if the send itself never completes.
            let message = self
                .messages
                .create(tenant, country, request.mobile_number, request.body)
                .await;
            let callback_url = self.callback_host.report_url(provider.name(), message.id);

            // A configuration failure here means nothing was handed to any
            // provider, so no callback can ever arrive; the message is dead
            // and must not linger in Pending.
            let client = match self.clients.get_or_create(&bridge).await {
                Ok(client) => client,
                Err(err) => {
                    self.messages
                        .apply_status(message.id, DeliveryStatus::Failed)
                        .await?;
                    self.record_outcome(tenant, provider.name(), "config_error");
                    return Err(err);
                }
            };

            let send = provider.send(&client, &bridge, &message, &callback_url);
            let outcome = match tokio::time::timeout(self.send_timeout, send).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => {
                    // Definite provider failure: terminal for this send.
                    self.messages
                        .apply_status(message.id, DeliveryStatus::Failed)
                        .await?;
                    self.record_outcome(tenant, provider.name(), "error");
                    return Err(err);
                }
                Err(_) => {
                    // The provider may still have the message; leave it
                    // Pending so a late delivery report can correlate.
                    warn!(message_id = %message.id, "provider send timed out");
                    self.record_outcome(tenant, provider.name(), "timeout");
                    return Err(GatewayError::dispatch(
                        provider.name(),
                        format!("send timed out after {:?}", self.send_timeout),
                    ));
                }
            };

            let change = self
                .messages
                .record_dispatch(message.id, Some(outcome.external_id.clone()), outcome.status)
                .await?;

            info!(
                message_id = %message.id,
                external_id = %outcome.external_id,
                status = %change.current,
                "message accepted by provider"
            );
            self.record_outcome(tenant, provider.name(), "ok");

            Ok(DispatchReceipt {
                message_id: message.id,
                external_id: outcome.external_id,
                status: change.current,
            })
        }
        .instrument(span)
        .await
    }

    fn record_outcome(&self, tenant: TenantId, provider: &str, outcome: &'static str) {
        counter!(
            "sms_dispatch_total",
            "tenant" => tenant.to_string(),
            "provider" => provider.to_string(),
            "outcome" => outcome
        )
        .increment(1);
    }
}
