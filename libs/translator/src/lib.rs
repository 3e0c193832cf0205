//! Translation of provider-native delivery statuses into the gateway's
//! canonical vocabulary.
//!
//! Each provider gets one pure, total mapping function: every input,
//! including codes unknown at implementation time, maps to a defined
//! [`smsgw_core::DeliveryStatus`] (`Unknown` as the fallback), and nothing
//! here performs I/O or panics. This isolates provider vocabulary churn from
//! the rest of the system.

use serde::{Deserialize, Serialize};

pub mod infobip;
pub mod telerivet;

/// A provider-native status as it appears on the wire: either a numeric
/// group/code or a free-form textual code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NativeStatus {
    Group(i64),
    Code(String),
}

impl NativeStatus {
    pub fn group(value: i64) -> Self {
        NativeStatus::Group(value)
    }

    pub fn code(value: impl Into<String>) -> Self {
        NativeStatus::Code(value.into())
    }
}

impl std::fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeStatus::Group(value) => write!(f, "{value}"),
            NativeStatus::Code(value) => f.write_str(value),
        }
    }
}
