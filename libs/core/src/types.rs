use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Identifier of an authenticated tenant. Authentication itself happens
    /// upstream; the core only ever sees the id.
    TenantId
);
id_newtype!(
    /// Identifier of a destination country owned by a tenant.
    CountryId
);
id_newtype!(
    /// Identifier of a bridge configuration.
    BridgeId
);
id_newtype!(
    /// Identifier of an outbound message, assigned before the provider send
    /// so it can serve as the callback correlation key.
    MessageId
);

/// Destination country scoped to a tenant.
///
/// Used to compose full destination numbers (`code + mobile_number`) and to
/// scope bridge lookup. CRUD for countries lives outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub tenant_id: TenantId,
    /// Human-readable name, e.g. `United States`.
    pub name: String,
    /// Dialing code including the plus sign, e.g. `+1`.
    pub code: String,
}

/// A tenant-owned configuration binding a provider, country, sending number,
/// and credentials ("SMS bridge").
///
/// The `config` map carries provider-specific keys (see [`crate::constants`]);
/// which keys are required depends on the provider and its auth type, and is
/// checked at client-construction time rather than here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub id: BridgeId,
    pub tenant_id: TenantId,
    pub country_id: CountryId,
    /// Sender phone number presented to the provider.
    pub phone_number: String,
    /// Provider name selecting the adapter, e.g. `infobip`.
    pub provider: String,
    #[serde(default)]
    pub description: String,
    /// Dialing code of the target country, denormalized onto the bridge so
    /// dispatch does not need a country lookup.
    pub country_code: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl BridgeConfig {
    /// Returns a configuration value, treating blank values as absent.
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Returns a configuration value required by the selected provider, or a
    /// [`GatewayError::MissingConfig`] naming the offending key.
    pub fn require_config(&self, key: &'static str) -> Result<&str, GatewayError> {
        self.config_value(key).ok_or(GatewayError::MissingConfig {
            provider: self.provider.clone(),
            key,
        })
    }
}

/// How the gateway authenticates against a provider endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthorizationType {
    Basic,
    Api,
    Custom,
}

impl AuthorizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationType::Basic => "BASIC",
            AuthorizationType::Api => "API",
            AuthorizationType::Custom => "CUSTOM",
        }
    }

    /// Parses the `PROVIDER_AUTH_TYPE` configuration value. Absent values
    /// default to `BASIC`; unrecognized values are a configuration error,
    /// never a silent fallback.
    pub fn parse(value: Option<&str>) -> Result<Self, GatewayError> {
        match value {
            None => Ok(AuthorizationType::Basic),
            Some(raw) => match raw.trim().to_ascii_uppercase().as_str() {
                "BASIC" => Ok(AuthorizationType::Basic),
                "API" => Ok(AuthorizationType::Api),
                "CUSTOM" => Ok(AuthorizationType::Custom),
                other => Err(GatewayError::UnsupportedAuthType(other.to_string())),
            },
        }
    }
}

/// Canonical delivery status vocabulary. Every provider-native code is
/// translated into this set; no provider status leaks past the translators.
///
/// ```
/// use smsgw_core::DeliveryStatus;
///
/// assert_eq!(DeliveryStatus::Delivered.as_str(), "DELIVERED");
/// assert!(DeliveryStatus::Failed.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
    Unknown,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Failed => "FAILED",
            DeliveryStatus::Unknown => "UNKNOWN",
        }
    }

    /// Terminal statuses are monotonic endpoints and are never overwritten.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            DeliveryStatus::Pending => 0,
            DeliveryStatus::Unknown => 1,
            DeliveryStatus::Sent => 2,
            DeliveryStatus::Delivered | DeliveryStatus::Failed => 3,
        }
    }

    /// Applies `incoming` on top of `current` under the monotonic state
    /// machine: a status only advances, duplicates are no-ops, and a less
    /// final status arriving after a terminal one is ignored.
    ///
    /// ```
    /// use smsgw_core::DeliveryStatus::*;
    ///
    /// assert_eq!(Sent.advance(Delivered), Delivered);
    /// assert_eq!(Delivered.advance(Sent), Delivered);
    /// assert_eq!(Delivered.advance(Failed), Delivered);
    /// ```
    pub fn advance(self, incoming: DeliveryStatus) -> DeliveryStatus {
        if incoming.rank() > self.rank() { incoming } else { self }
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound SMS tracked by the gateway.
///
/// `external_id` stays `None` until a provider accepts the message; `status`
/// starts [`DeliveryStatus::Pending`] and only moves forward from there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub id: MessageId,
    pub tenant_id: TenantId,
    pub country_id: CountryId,
    /// Local number without the country prefix. Format validation happens in
    /// the create/validate step upstream.
    pub mobile_number: String,
    pub body: String,
    pub external_id: Option<String>,
    pub status: DeliveryStatus,
}

/// Result of a monotonic status update on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: DeliveryStatus,
    pub current: DeliveryStatus,
}

impl StatusChange {
    /// Whether the update actually moved the message forward.
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_monotonic() {
        use DeliveryStatus::*;
        let mut status = Pending;
        for incoming in [Sent, Delivered, Sent] {
            status = status.advance(incoming);
        }
        assert_eq!(status, Delivered);

        assert_eq!(Pending.advance(Delivered).advance(Sent), Delivered);
        assert_eq!(Pending.advance(Failed), Failed);
        assert_eq!(Failed.advance(Delivered), Failed);
        assert_eq!(Sent.advance(Unknown), Sent);
        assert_eq!(Pending.advance(Unknown), Unknown);
        assert_eq!(Unknown.advance(Sent), Sent);
    }

    #[test]
    fn advance_is_idempotent() {
        use DeliveryStatus::*;
        for status in [Pending, Sent, Delivered, Failed, Unknown] {
            assert_eq!(status.advance(status), status);
        }
    }

    #[test]
    fn auth_type_parses_with_basic_default() {
        assert_eq!(
            AuthorizationType::parse(None).unwrap(),
            AuthorizationType::Basic
        );
        assert_eq!(
            AuthorizationType::parse(Some("api")).unwrap(),
            AuthorizationType::Api
        );
        assert_eq!(
            AuthorizationType::parse(Some(" Custom ")).unwrap(),
            AuthorizationType::Custom
        );
        let err = AuthorizationType::parse(Some("OAUTH2")).unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedAuthType(ref t) if t == "OAUTH2"));
    }

    #[test]
    fn blank_config_values_are_absent() {
        let bridge = BridgeConfig {
            id: BridgeId(1),
            tenant_id: TenantId(1),
            country_id: CountryId(1),
            phone_number: "555".into(),
            provider: "infobip".into(),
            description: String::new(),
            country_code: "+1".into(),
            config: [(crate::constants::PROVIDER_URL.to_string(), "  ".to_string())]
                .into_iter()
                .collect(),
        };
        assert!(bridge.config_value(crate::constants::PROVIDER_URL).is_none());
        let err = bridge
            .require_config(crate::constants::PROVIDER_URL)
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingConfig { key, .. } if key == "PROVIDER_URL"));
    }

    #[test]
    fn delivery_status_serializes_screaming() {
        let json = serde_json::to_string(&DeliveryStatus::Delivered).unwrap();
        assert_eq!(json, "\"DELIVERED\"");
    }
}
