//! Store contracts the orchestration layer is written against, plus the
//! in-memory implementations used by the binary seed and by tests.
//!
//! Durable persistence is an external collaborator; these traits describe
//! only the reads and updates the core needs.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::GatewayError;
use crate::types::{
    BridgeConfig, BridgeId, CountryId, DeliveryStatus, MessageId, OutboundMessage, StatusChange,
    TenantId,
};

/// Read-only view over persisted bridge configurations.
#[async_trait]
pub trait BridgeConfigStore: Send + Sync {
    /// Resolves the bridge to use for a (tenant, country) pair. When several
    /// bridges match, the lowest bridge id wins deterministically; callers
    /// that need a specific one disambiguate via [`Self::resolve_by_id`].
    async fn resolve(
        &self,
        tenant: TenantId,
        country: CountryId,
    ) -> Result<BridgeConfig, GatewayError>;

    /// Resolves a specific bridge owned by the tenant.
    async fn resolve_by_id(
        &self,
        tenant: TenantId,
        bridge: BridgeId,
    ) -> Result<BridgeConfig, GatewayError>;

    /// Returns every bridge configured for the pair, in id order.
    async fn find_by_tenant_and_country(
        &self,
        tenant: TenantId,
        country: CountryId,
    ) -> Vec<BridgeConfig>;
}

/// Shared trait object wrapper.
pub type SharedBridgeStore = Arc<dyn BridgeConfigStore>;

/// Mutable view over outbound message state.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Creates a message in [`DeliveryStatus::Pending`] and assigns its id.
    /// The id must exist before the provider send so callbacks can be
    /// correlated even when the send itself times out.
    async fn create(
        &self,
        tenant: TenantId,
        country: CountryId,
        mobile_number: String,
        body: String,
    ) -> OutboundMessage;

    async fn get(&self, id: MessageId) -> Option<OutboundMessage>;

    /// Records the outcome of a provider send: stores the external id and
    /// applies the initial status monotonically (a callback may already have
    /// advanced the message past it).
    async fn record_dispatch(
        &self,
        id: MessageId,
        external_id: Option<String>,
        status: DeliveryStatus,
    ) -> Result<StatusChange, GatewayError>;

    /// Applies a canonical status under the monotonic state machine. The
    /// update is serialized per message id, so concurrent callbacks for the
    /// same message cannot race to an incorrect final state.
    async fn apply_status(
        &self,
        id: MessageId,
        status: DeliveryStatus,
    ) -> Result<StatusChange, GatewayError>;
}

/// Shared trait object wrapper.
pub type SharedMessageStore = Arc<dyn MessageStore>;

/// In-memory bridge store for the seed file and tests.
#[derive(Default)]
pub struct InMemoryBridgeStore {
    bridges: DashMap<BridgeId, BridgeConfig>,
}

impl InMemoryBridgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bridge: BridgeConfig) {
        self.bridges.insert(bridge.id, bridge);
    }
}

#[async_trait]
impl BridgeConfigStore for InMemoryBridgeStore {
    async fn resolve(
        &self,
        tenant: TenantId,
        country: CountryId,
    ) -> Result<BridgeConfig, GatewayError> {
        self.find_by_tenant_and_country(tenant, country)
            .await
            .into_iter()
            .next()
            .ok_or(GatewayError::BridgeNotFound { tenant, country })
    }

    async fn resolve_by_id(
        &self,
        tenant: TenantId,
        bridge: BridgeId,
    ) -> Result<BridgeConfig, GatewayError> {
        self.bridges
            .get(&bridge)
            .filter(|entry| entry.tenant_id == tenant)
            .map(|entry| entry.clone())
            .ok_or(GatewayError::BridgeIdNotFound { tenant, bridge })
    }

    async fn find_by_tenant_and_country(
        &self,
        tenant: TenantId,
        country: CountryId,
    ) -> Vec<BridgeConfig> {
        let mut matches: Vec<BridgeConfig> = self
            .bridges
            .iter()
            .filter(|entry| entry.tenant_id == tenant && entry.country_id == country)
            .map(|entry| entry.clone())
            .collect();
        matches.sort_by_key(|bridge| bridge.id);
        matches
    }
}

/// In-memory message store. Entry-level guards from the underlying map
/// serialize updates per message id.
pub struct InMemoryMessageStore {
    messages: DashMap<MessageId, OutboundMessage>,
    next_id: AtomicI64,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            messages: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Inserts a message with a caller-chosen id, for tests that need to
    /// reference a known id before any dispatch happened.
    pub fn insert(&self, message: OutboundMessage) {
        let candidate = message.id.0 + 1;
        self.next_id.fetch_max(candidate, Ordering::SeqCst);
        self.messages.insert(message.id, message);
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(
        &self,
        tenant: TenantId,
        country: CountryId,
        mobile_number: String,
        body: String,
    ) -> OutboundMessage {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let message = OutboundMessage {
            id,
            tenant_id: tenant,
            country_id: country,
            mobile_number,
            body,
            external_id: None,
            status: DeliveryStatus::Pending,
        };
        self.messages.insert(id, message.clone());
        message
    }

    async fn get(&self, id: MessageId) -> Option<OutboundMessage> {
        self.messages.get(&id).map(|entry| entry.clone())
    }

    async fn record_dispatch(
        &self,
        id: MessageId,
        external_id: Option<String>,
        status: DeliveryStatus,
    ) -> Result<StatusChange, GatewayError> {
        let mut entry = self
            .messages
            .get_mut(&id)
            .ok_or_else(|| GatewayError::correlation(id, "message not found"))?;
        if external_id.is_some() {
            entry.external_id = external_id;
        }
        let previous = entry.status;
        entry.status = previous.advance(status);
        Ok(StatusChange {
            previous,
            current: entry.status,
        })
    }

    async fn apply_status(
        &self,
        id: MessageId,
        status: DeliveryStatus,
    ) -> Result<StatusChange, GatewayError> {
        let mut entry = self
            .messages
            .get_mut(&id)
            .ok_or_else(|| GatewayError::correlation(id, "message not found"))?;
        let previous = entry.status;
        entry.status = previous.advance(status);
        Ok(StatusChange {
            previous,
            current: entry.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn bridge(id: i64, tenant: i64, country: i64, provider: &str) -> BridgeConfig {
        BridgeConfig {
            id: BridgeId(id),
            tenant_id: TenantId(tenant),
            country_id: CountryId(country),
            phone_number: "12025550100".into(),
            provider: provider.into(),
            description: String::new(),
            country_code: "+1".into(),
            config: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn resolve_picks_lowest_bridge_id() {
        let store = InMemoryBridgeStore::new();
        store.insert(bridge(9, 1, 1, "telerivet"));
        store.insert(bridge(2, 1, 1, "infobip"));
        store.insert(bridge(5, 2, 1, "infobip"));

        let resolved = store.resolve(TenantId(1), CountryId(1)).await.unwrap();
        assert_eq!(resolved.id, BridgeId(2));
        assert_eq!(resolved.provider, "infobip");

        let all = store
            .find_by_tenant_and_country(TenantId(1), CountryId(1))
            .await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, BridgeId(2));
    }

    #[tokio::test]
    async fn resolve_reports_missing_bridge() {
        let store = InMemoryBridgeStore::new();
        let err = store.resolve(TenantId(1), CountryId(99)).await.unwrap_err();
        assert!(matches!(err, GatewayError::BridgeNotFound { .. }));
    }

    #[tokio::test]
    async fn resolve_by_id_is_tenant_scoped() {
        let store = InMemoryBridgeStore::new();
        store.insert(bridge(4, 1, 1, "infobip"));
        assert!(store.resolve_by_id(TenantId(1), BridgeId(4)).await.is_ok());
        assert!(
            store
                .resolve_by_id(TenantId(2), BridgeId(4))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn create_assigns_monotonic_ids() {
        let store = InMemoryMessageStore::new();
        let first = store
            .create(TenantId(1), CountryId(1), "5551234".into(), "hi".into())
            .await;
        let second = store
            .create(TenantId(1), CountryId(1), "5555678".into(), "yo".into())
            .await;
        assert!(second.id > first.id);
        assert_eq!(first.status, DeliveryStatus::Pending);
        assert!(first.external_id.is_none());
    }

    #[tokio::test]
    async fn record_dispatch_keeps_callback_that_raced_ahead() {
        let store = InMemoryMessageStore::new();
        let message = store
            .create(TenantId(1), CountryId(1), "5551234".into(), "hi".into())
            .await;

        // Callback lands before the send result is recorded.
        store
            .apply_status(message.id, DeliveryStatus::Delivered)
            .await
            .unwrap();

        let change = store
            .record_dispatch(message.id, Some("ext-1".into()), DeliveryStatus::Sent)
            .await
            .unwrap();
        assert_eq!(change.current, DeliveryStatus::Delivered);

        let stored = store.get(message.id).await.unwrap();
        assert_eq!(stored.external_id.as_deref(), Some("ext-1"));
        assert_eq!(stored.status, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn apply_status_rejects_unknown_message() {
        let store = InMemoryMessageStore::new();
        let err = store
            .apply_status(MessageId(42), DeliveryStatus::Sent)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::CallbackCorrelation { .. }));
    }

    #[tokio::test]
    async fn duplicate_status_is_a_noop() {
        let store = InMemoryMessageStore::new();
        let message = store
            .create(TenantId(1), CountryId(1), "5551234".into(), "hi".into())
            .await;
        store
            .apply_status(message.id, DeliveryStatus::Sent)
            .await
            .unwrap();
        let change = store
            .apply_status(message.id, DeliveryStatus::Sent)
            .await
            .unwrap();
        assert!(!change.changed());
        assert_eq!(change.current, DeliveryStatus::Sent);
    }
}
