//! REST endpoint handlers.
//!
//! One endpoint does the work: `POST /api/push` authenticates nothing by
//! itself (signing configuration gates it) and fans the message out to
//! every recipient subscription. Errors follow the taxonomy: malformed
//! input is a structured 4xx, missing configuration is a 500 scoped to the
//! request, and per-recipient delivery failure is logged and isolated.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Local;
use courier_rs::notify::PushPayload;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::SigningKeys;
use crate::sender::PushSender;

/// Shared application state passed to all handlers via axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    pub sender: Arc<dyn PushSender>,
    pub signing: Option<Arc<SigningKeys>>,
}

// ── Wire types ─────────────────────────────────────────────────────

/// Encryption keys attached to a push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// One recipient's push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<SubscriptionKeys>,
}

/// Request body for `POST /api/push`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub message_text: Option<String>,
    #[serde(default)]
    pub recipients: Vec<Subscription>,
}

/// Success body for `POST /api/push`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    /// Attempted deliveries — not confirmed ones.
    pub sent: usize,
}

// ── Handlers ───────────────────────────────────────────────────────

/// `OPTIONS /api/push` — CORS preflight, no content.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `POST /api/push` — fan one message out to every recipient.
///
/// Responds 400 when there is nobody to send to, 500 when signing keys
/// are not configured, and 200 with the attempted count otherwise.
pub async fn send_push(
    State(app): State<AppState>,
    Json(body): Json<SendRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    if body.recipients.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No recipients"})),
        );
    }

    let Some(signing) = app.signing.clone() else {
        error!("send rejected: signing keys not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Signing keys not configured"})),
        );
    };
    tracing::debug!("sending on behalf of {}", signing.contact);

    let payload = build_payload(&body);
    let serialized = match serde_json::to_string(&payload) {
        Ok(s) => s,
        Err(err) => {
            error!("failed to serialize payload: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Payload serialization failed"})),
            );
        }
    };

    // Per-recipient isolation: a failed delivery is logged, never retried,
    // and never fails the batch.
    let attempted = body.recipients.len();
    for recipient in body.recipients {
        if let Err(err) = app.sender.send(recipient, serialized.clone()).await {
            warn!("push delivery failed: {err}");
        }
    }

    info!("fanned out to {attempted} recipient(s)");
    (
        StatusCode::OK,
        Json(json!(SendResponse {
            success: true,
            sent: attempted,
        })),
    )
}

/// Build the agent-side payload from one send request.
fn build_payload(body: &SendRequest) -> PushPayload {
    let sender_name = body.sender_name.as_deref().unwrap_or("Someone");
    let timestamp = Local::now().format("%H:%M");
    PushPayload {
        title: Some(format!("New message from {sender_name}")),
        body: Some(format!("Courier • {timestamp}")),
        data: Some(json!({
            "chatId": body.chat_id,
            "senderId": body.sender_id,
            "senderName": sender_name,
        })),
        tag: None,
        actions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_deserializes_camel_case() {
        let json = r#"{
            "chatId": "c1",
            "senderId": "u1",
            "senderName": "Ada",
            "messageText": "hi",
            "recipients": [{"endpoint": "https://push.test/sub1",
                            "keys": {"p256dh": "pk", "auth": "ak"}}]
        }"#;
        let req: SendRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.sender_name.as_deref(), Some("Ada"));
        assert_eq!(req.recipients.len(), 1);
        assert_eq!(req.recipients[0].endpoint, "https://push.test/sub1");
    }

    #[test]
    fn missing_fields_default() {
        let req: SendRequest = serde_json::from_str("{}").unwrap();
        assert!(req.recipients.is_empty());
        assert!(req.sender_name.is_none());
    }

    #[test]
    fn payload_defaults_sender_to_someone() {
        let req: SendRequest = serde_json::from_str("{}").unwrap();
        let payload = build_payload(&req);
        assert_eq!(payload.title.as_deref(), Some("New message from Someone"));
        assert!(payload.body.unwrap().starts_with("Courier • "));
    }

    #[test]
    fn payload_carries_chat_routing_data() {
        let req: SendRequest =
            serde_json::from_str(r#"{"chatId": "c9", "senderId": "u3", "senderName": "Ada"}"#)
                .unwrap();
        let payload = build_payload(&req);
        let data = payload.data.unwrap();
        assert_eq!(data["chatId"], "c9");
        assert_eq!(data["senderId"], "u3");
        assert_eq!(data["senderName"], "Ada");
    }

    #[test]
    fn payload_decodes_on_the_agent_side() {
        // The relay's payload must round-trip through the agent's decoder.
        let req: SendRequest = serde_json::from_str(r#"{"senderName": "Ada"}"#).unwrap();
        let serialized = serde_json::to_vec(&build_payload(&req)).unwrap();
        let decoded = PushPayload::decode(Some(&serialized));
        assert_eq!(decoded.title.as_deref(), Some("New message from Ada"));
        assert_eq!(decoded.sender_name(), Some("Ada"));
    }
}
