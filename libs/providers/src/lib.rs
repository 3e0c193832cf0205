//! Provider adapters for the SMS gateway.
//!
//! One adapter per external delivery service, all behind the [`SmsProvider`]
//! contract, plus the credential-fingerprint client cache that lets
//! concurrent requests share provider connections safely.

pub mod client;
pub mod providers;
pub mod registry;
pub mod traits;

pub use client::{AuthScheme, ClientFingerprint, ProviderClientCache, SmsClient};
pub use registry::{ProviderRegistry, RegistryError};
pub use traits::{SendOutcome, SmsProvider, compose_destination};
