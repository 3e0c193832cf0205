//! InfoBip adapter: advanced textual send with delivery notifications.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use smsgw_core::{BridgeConfig, DeliveryStatus, GatewayError, MessageId, OutboundMessage};
use smsgw_translator::{NativeStatus, infobip};

use crate::client::SmsClient;
use crate::traits::{SendOutcome, SmsProvider, compose_destination};

pub const PROVIDER_NAME: &str = "infobip";

const SEND_PATH: &str = "sms/2/text/advanced";

pub struct InfoBipProvider;

impl InfoBipProvider {
    pub fn new() -> Self {
        Self
    }

    fn build_payload(
        bridge: &BridgeConfig,
        message: &OutboundMessage,
        callback_url: &str,
    ) -> Value {
        let destination = compose_destination(&bridge.country_code, &message.mobile_number);
        json!({
            "messages": [{
                "from": bridge.phone_number,
                "destinations": [{ "to": destination }],
                "text": message.body,
                "notifyUrl": callback_url,
                "notifyContentType": "application/json",
                "notify": true,
                "intermediateReport": true,
            }]
        })
    }

    fn mock_outcome(&self, scenario: &str, payload: Value) -> Result<SendOutcome, GatewayError> {
        let group = match scenario {
            "accepted" => 1,
            "delivered" => 3,
            "rejected" => 5,
            "denied" => {
                return Err(GatewayError::dispatch(
                    PROVIDER_NAME,
                    "status=401 body=invalid credentials",
                ));
            }
            other => {
                return Err(GatewayError::dispatch(
                    PROVIDER_NAME,
                    format!("unknown mock scenario `{other}`"),
                ));
            }
        };
        Ok(SendOutcome {
            external_id: "mock-infobip-id".into(),
            status: self.translate(&NativeStatus::group(group)),
            raw: payload,
        })
    }
}

impl Default for InfoBipProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsProvider for InfoBipProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn send(
        &self,
        client: &SmsClient,
        bridge: &BridgeConfig,
        message: &OutboundMessage,
        callback_url: &str,
    ) -> Result<SendOutcome, GatewayError> {
        let payload = Self::build_payload(bridge, message, callback_url);
        info!(
            message_id = %message.id,
            to = %compose_destination(&bridge.country_code, &message.mobile_number),
            "sending SMS via InfoBip"
        );

        if let Some(scenario) = client.mock_scenario() {
            return self.mock_outcome(scenario, payload);
        }

        let response = client
            .post(SEND_PATH)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                GatewayError::dispatch(PROVIDER_NAME, format!("failed to call InfoBip: {err}"))
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            GatewayError::dispatch(PROVIDER_NAME, format!("failed to read response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(GatewayError::dispatch(
                PROVIDER_NAME,
                format!("status={} body={}", status.as_u16(), body_text),
            ));
        }

        let raw: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);
        let parsed: InfoBipSendResponse = serde_json::from_str(&body_text).map_err(|err| {
            GatewayError::dispatch(PROVIDER_NAME, format!("invalid InfoBip response: {err}"))
        })?;
        let details = parsed.messages.into_iter().next().ok_or_else(|| {
            GatewayError::dispatch(PROVIDER_NAME, "response carried no message details")
        })?;

        let native = NativeStatus::group(details.status.group_id);
        let status = self.translate(&native);
        debug!(external_id = %details.message_id, %native, %status, "InfoBip accepted message");

        Ok(SendOutcome {
            external_id: details.message_id,
            status,
            raw,
        })
    }

    fn parse_report(
        &self,
        message_id: MessageId,
        payload: &Value,
    ) -> Result<NativeStatus, GatewayError> {
        let report: InfoBipReport = serde_json::from_value(payload.clone())
            .map_err(|err| GatewayError::correlation(message_id, format!("malformed delivery report: {err}")))?;
        let result = report.results.into_iter().next().ok_or_else(|| {
            GatewayError::correlation(message_id, "delivery report carried no results")
        })?;
        Ok(NativeStatus::group(result.status.group_id))
    }

    fn translate(&self, native: &NativeStatus) -> DeliveryStatus {
        infobip::translate(native)
    }
}

#[derive(Deserialize)]
struct InfoBipSendResponse {
    messages: Vec<InfoBipMessageDetails>,
}

#[derive(Deserialize)]
struct InfoBipMessageDetails {
    #[serde(rename = "messageId")]
    message_id: String,
    status: InfoBipStatusBody,
}

#[derive(Deserialize)]
struct InfoBipStatusBody {
    #[serde(rename = "groupId")]
    group_id: i64,
}

#[derive(Deserialize)]
struct InfoBipReport {
    results: Vec<InfoBipReportResult>,
}

#[derive(Deserialize)]
struct InfoBipReportResult {
    status: InfoBipStatusBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsgw_core::{BridgeId, CountryId, TenantId, constants};
    use std::collections::BTreeMap;

    fn bridge() -> BridgeConfig {
        let config: BTreeMap<String, String> = [
            (constants::PROVIDER_URL, "mock://accepted"),
            (constants::PROVIDER_AUTH_TYPE, "BASIC"),
            (constants::PROVIDER_ACCOUNT_ID, "acct1"),
            (constants::PROVIDER_AUTH_TOKEN, "secret1"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        BridgeConfig {
            id: BridgeId(1),
            tenant_id: TenantId(1),
            country_id: CountryId(1),
            phone_number: "12025550100".into(),
            provider: PROVIDER_NAME.into(),
            description: String::new(),
            country_code: "+1".into(),
            config,
        }
    }

    fn message() -> OutboundMessage {
        OutboundMessage {
            id: MessageId(42),
            tenant_id: TenantId(1),
            country_id: CountryId(1),
            mobile_number: "5551234".into(),
            body: "hello".into(),
            external_id: None,
            status: DeliveryStatus::Pending,
        }
    }

    #[test]
    fn payload_composes_destination_and_callback() {
        let payload = InfoBipProvider::build_payload(
            &bridge(),
            &message(),
            "http://gw.local:9191/infobip/report/42",
        );
        let entry = &payload["messages"][0];
        assert_eq!(entry["destinations"][0]["to"], "+15551234");
        assert_eq!(entry["from"], "12025550100");
        assert_eq!(entry["text"], "hello");
        assert_eq!(entry["notifyUrl"], "http://gw.local:9191/infobip/report/42");
        assert_eq!(entry["notify"], true);
        assert_eq!(entry["notifyContentType"], "application/json");
    }

    #[tokio::test]
    async fn mock_send_translates_immediate_status() {
        let provider = InfoBipProvider::new();
        let client = SmsClient::from_bridge(&bridge()).unwrap();
        let outcome = provider
            .send(&client, &bridge(), &message(), "http://gw/infobip/report/42")
            .await
            .unwrap();
        assert_eq!(outcome.external_id, "mock-infobip-id");
        assert_eq!(outcome.status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn mock_delivered_scenario_maps_group_three() {
        let mut bridge = bridge();
        bridge.config.insert(
            constants::PROVIDER_URL.to_string(),
            "mock://delivered".to_string(),
        );
        let client = SmsClient::from_bridge(&bridge).unwrap();
        let outcome = InfoBipProvider::new()
            .send(&client, &bridge, &message(), "http://gw/infobip/report/42")
            .await
            .unwrap();
        assert_eq!(outcome.status, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn mock_denied_scenario_surfaces_dispatch_error() {
        let mut bridge = bridge();
        bridge.config.insert(
            constants::PROVIDER_URL.to_string(),
            "mock://denied".to_string(),
        );
        let client = SmsClient::from_bridge(&bridge).unwrap();
        let err = InfoBipProvider::new()
            .send(&client, &bridge, &message(), "http://gw/infobip/report/42")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::ProviderDispatch { ref provider, .. } if provider == PROVIDER_NAME
        ));
    }

    #[test]
    fn report_parsing_extracts_group() {
        let provider = InfoBipProvider::new();
        let payload = serde_json::json!({
            "results": [{
                "messageId": "ib-1",
                "status": { "groupId": 3, "groupName": "DELIVERED" }
            }]
        });
        let native = provider.parse_report(MessageId(42), &payload).unwrap();
        assert_eq!(native, NativeStatus::group(3));
        assert_eq!(provider.translate(&native), DeliveryStatus::Delivered);
    }

    #[test]
    fn malformed_report_is_a_correlation_error() {
        let provider = InfoBipProvider::new();
        let err = provider
            .parse_report(MessageId(42), &serde_json::json!({"results": []}))
            .unwrap_err();
        assert!(matches!(err, GatewayError::CallbackCorrelation { .. }));

        let err = provider
            .parse_report(MessageId(42), &serde_json::json!("not a report"))
            .unwrap_err();
        assert!(matches!(err, GatewayError::CallbackCorrelation { .. }));
    }
}
