//! SMS gateway core contracts and value types.
//!
//! This crate exposes the data structures shared between the dispatcher,
//! provider adapters, and the callback correlator, along with the gateway
//! error taxonomy and the store contracts the orchestration layer is
//! written against.
pub mod constants;
pub mod error;
pub mod store;
pub mod types;

pub use constants::*;
pub use error::*;
pub use store::*;
pub use types::*;
