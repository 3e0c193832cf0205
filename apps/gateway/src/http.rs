use std::sync::Arc;

use axum::{
    Router, debug_handler,
    extract::{Extension, Json, Path},
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use smsgw_core::{CountryId, DeliveryStatus, GatewayError, MessageId, TenantId};
use smsgw_dispatch::{CallbackCorrelator, DispatchRequest, MessageDispatcher};

/// Shared handler state.
pub struct GatewayState {
    pub dispatcher: MessageDispatcher,
    pub correlator: CallbackCorrelator,
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/api/{tenant}/{country}/sms", post(send_sms))
        .route("/{provider}/report/{message_id}", post(delivery_report))
        .layer(Extension(state))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsRequest {
    pub mobile_number: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsResponse {
    pub id: MessageId,
    pub external_id: String,
    pub status: DeliveryStatus,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub status: DeliveryStatus,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

#[debug_handler]
async fn send_sms(
    Path((tenant, country)): Path<(i64, i64)>,
    Extension(state): Extension<Arc<GatewayState>>,
    Json(payload): Json<SendSmsRequest>,
) -> Result<(StatusCode, Json<SendSmsResponse>), (StatusCode, Json<ApiError>)> {
    let request = DispatchRequest {
        mobile_number: payload.mobile_number,
        body: payload.message,
    };
    let receipt = state
        .dispatcher
        .dispatch(TenantId(tenant), CountryId(country), request)
        .await
        .map_err(reject)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SendSmsResponse {
            id: receipt.message_id,
            external_id: receipt.external_id,
            status: receipt.status,
        }),
    ))
}

/// Callback ingress. The body is untrusted provider input; the correlator
/// validates the referenced message before mutating anything, and a failure
/// here never affects other messages.
#[debug_handler]
async fn delivery_report(
    Path((provider, message_id)): Path<(String, i64)>,
    Extension(state): Extension<Arc<GatewayState>>,
    Json(payload): Json<Value>,
) -> Result<Json<ReportResponse>, (StatusCode, Json<ApiError>)> {
    let change = state
        .correlator
        .correlate(&provider, MessageId(message_id), &payload)
        .await
        .map_err(|err| {
            warn!(%provider, message_id, error = %err, "delivery report rejected");
            reject(err)
        })?;

    Ok(Json(ReportResponse {
        status: change.current,
    }))
}

fn reject(err: GatewayError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        GatewayError::BridgeNotFound { .. }
        | GatewayError::BridgeIdNotFound { .. }
        | GatewayError::ProviderNotFound(_)
        | GatewayError::CallbackCorrelation { .. } => StatusCode::NOT_FOUND,
        GatewayError::UnsupportedAuthType(_) | GatewayError::MissingConfig { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GatewayError::ProviderDispatch { .. } => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_expected_statuses() {
        let (status, _) = reject(GatewayError::BridgeNotFound {
            tenant: TenantId(1),
            country: CountryId(1),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = reject(GatewayError::MissingConfig {
            provider: "infobip".into(),
            key: "PROVIDER_AUTH_TOKEN",
        });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = reject(GatewayError::dispatch("infobip", "status=500"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
