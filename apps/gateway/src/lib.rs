//! HTTP surface of the SMS gateway.
//!
//! The binary wires the in-memory stores, the builtin provider registry,
//! and the client cache into a [`MessageDispatcher`]/[`CallbackCorrelator`]
//! pair, then exposes them through two routes: the dispatch entry point and
//! the per-provider callback ingress.
//!
//! [`MessageDispatcher`]: smsgw_dispatch::MessageDispatcher
//! [`CallbackCorrelator`]: smsgw_dispatch::CallbackCorrelator

pub mod config;
pub mod http;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use smsgw_core::{InMemoryBridgeStore, InMemoryMessageStore, SharedMessageStore};
use smsgw_dispatch::{CallbackCorrelator, MessageDispatcher};
use smsgw_providers::{ProviderClientCache, ProviderRegistry};

pub use config::{GatewayConfig, SeedData};
pub use http::{GatewayState, build_router};

/// Builds the full handler state from configuration.
pub fn build_state(config: &GatewayConfig) -> Result<Arc<GatewayState>> {
    let bridges = Arc::new(InMemoryBridgeStore::new());
    if let Some(path) = &config.seed_file {
        let seed = SeedData::load(path)?;
        info!(bridges = seed.bridges.len(), "seeding bridge configurations");
        for bridge in seed.bridges {
            bridges.insert(bridge);
        }
    }

    let messages: SharedMessageStore = Arc::new(InMemoryMessageStore::new());
    let registry = Arc::new(ProviderRegistry::builtin());

    let dispatcher = MessageDispatcher::new(
        bridges,
        Arc::clone(&messages),
        Arc::clone(&registry),
        ProviderClientCache::new(),
        config.callback_host(),
        config.send_timeout,
    );
    let correlator = CallbackCorrelator::new(messages, registry);

    Ok(Arc::new(GatewayState {
        dispatcher,
        correlator,
    }))
}
