//! Telerivet adapter: project-scoped send with status webhooks.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use smsgw_core::{
    BridgeConfig, DeliveryStatus, GatewayError, MessageId, OutboundMessage, PROVIDER_ACCOUNT_ID,
};
use smsgw_translator::{NativeStatus, telerivet};

use crate::client::SmsClient;
use crate::traits::{SendOutcome, SmsProvider, compose_destination};

pub const PROVIDER_NAME: &str = "telerivet";

pub struct TelerivetProvider;

impl TelerivetProvider {
    pub fn new() -> Self {
        Self
    }

    /// Telerivet routes sends through a project; the bridge's account id is
    /// the project id.
    fn send_path(project_id: &str) -> String {
        format!("v1/projects/{project_id}/messages/send")
    }

    fn build_payload(
        bridge: &BridgeConfig,
        message: &OutboundMessage,
        callback_url: &str,
    ) -> Value {
        json!({
            "to_number": compose_destination(&bridge.country_code, &message.mobile_number),
            "from_number": bridge.phone_number,
            "content": message.body,
            "status_url": callback_url,
        })
    }

    fn mock_outcome(&self, scenario: &str, payload: Value) -> Result<SendOutcome, GatewayError> {
        let code = match scenario {
            "queued" => "queued",
            "delivered" => "delivered",
            "failed" => "failed",
            "denied" => {
                return Err(GatewayError::dispatch(
                    PROVIDER_NAME,
                    "status=403 body=invalid API key",
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
            external_id: "mock-telerivet-id".into(),
            status: self.translate(&NativeStatus::code(code)),
            raw: payload,
        })
    }
}

impl Default for TelerivetProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsProvider for TelerivetProvider {
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
        let project_id = bridge.require_config(PROVIDER_ACCOUNT_ID)?.to_string();
        let payload = Self::build_payload(bridge, message, callback_url);
        info!(
            message_id = %message.id,
            to = %compose_destination(&bridge.country_code, &message.mobile_number),
            "sending SMS via Telerivet"
        );

        if let Some(scenario) = client.mock_scenario() {
            return self.mock_outcome(scenario, payload);
        }

        let response = client
            .post(&Self::send_path(&project_id))
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                GatewayError::dispatch(PROVIDER_NAME, format!("failed to call Telerivet: {err}"))
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
        let parsed: TelerivetSendResponse = serde_json::from_str(&body_text).map_err(|err| {
            GatewayError::dispatch(PROVIDER_NAME, format!("invalid Telerivet response: {err}"))
        })?;

        let native = NativeStatus::code(parsed.status);
        let status = self.translate(&native);
        debug!(external_id = %parsed.id, %native, %status, "Telerivet accepted message");

        Ok(SendOutcome {
            external_id: parsed.id,
            status,
            raw,
        })
    }

    fn parse_report(
        &self,
        message_id: MessageId,
        payload: &Value,
    ) -> Result<NativeStatus, GatewayError> {
        let report: TelerivetReport = serde_json::from_value(payload.clone()).map_err(|err| {
            GatewayError::correlation(message_id, format!("malformed status webhook: {err}"))
        })?;
        Ok(NativeStatus::code(report.status))
    }

    fn translate(&self, native: &NativeStatus) -> DeliveryStatus {
        telerivet::translate(native)
    }

    /// Telerivet supports pull-style reads of a message's current status.
    async fn update_status_by_message_id(
        &self,
        client: &SmsClient,
        bridge: &BridgeConfig,
        external_id: &str,
    ) -> Result<Option<NativeStatus>, GatewayError> {
        let project_id = bridge.require_config(PROVIDER_ACCOUNT_ID)?.to_string();

        if client.is_mock() {
            return Ok(Some(NativeStatus::code("delivered")));
        }

        let response = client
            .get(&format!("v1/projects/{project_id}/messages/{external_id}"))
            .send()
            .await
            .map_err(|err| {
                GatewayError::dispatch(PROVIDER_NAME, format!("failed to poll Telerivet: {err}"))
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

        let parsed: TelerivetSendResponse = serde_json::from_str(&body_text).map_err(|err| {
            GatewayError::dispatch(PROVIDER_NAME, format!("invalid Telerivet response: {err}"))
        })?;
        Ok(Some(NativeStatus::code(parsed.status)))
    }
}

#[derive(Deserialize)]
struct TelerivetSendResponse {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct TelerivetReport {
    status: String,
}
