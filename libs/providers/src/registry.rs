use std::collections::HashMap;
use std::sync::Arc;

use smsgw_core::GatewayError;

use crate::providers::{infobip::InfoBipProvider, telerivet::TelerivetProvider};
use crate::traits::SmsProvider;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("provider `{0}` already registered")]
    AlreadyRegistered(String),
}

/// Name-keyed registry of provider adapters, resolved once at startup.
///
/// Bridge configs select their adapter by name through this registry; an
/// unregistered name surfaces as [`GatewayError::ProviderNotFound`] at
/// dispatch time.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: HashMap<String, Arc<dyn SmsProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every adapter this gateway ships.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(Arc::new(InfoBipProvider::new()))
            .and_then(|_| registry.register(Arc::new(TelerivetProvider::new())))
            .unwrap_or_else(|err| unreachable!("builtin providers have unique names: {err}"));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn SmsProvider>) -> Result<(), RegistryError> {
        let name = provider.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.entries.insert(name, provider);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn SmsProvider>, GatewayError> {
        self.entries
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| GatewayError::ProviderNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registers_all_adapters() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.get("infobip").is_ok());
        assert!(registry.get("telerivet").is_ok());
        let err = registry.get("nexmo").err().unwrap();
        assert!(matches!(err, GatewayError::ProviderNotFound(ref n) if n == "nexmo"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ProviderRegistry::builtin();
        let err = registry
            .register(Arc::new(InfoBipProvider::new()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(ref n) if n == "infobip"));
    }
}
