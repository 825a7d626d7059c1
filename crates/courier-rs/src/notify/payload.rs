//! The untrusted push payload wire format.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// An action button offered on a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Structured push payload. Every field is optional; the dispatcher
/// supplies defaults for all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<serde_json::Value>,
    pub tag: Option<String>,
    pub actions: Vec<TicketAction>,
}

impl PushPayload {
    /// Decode raw push data. Never fails: a missing or malformed payload
    /// becomes the empty payload so the event still surfaces a generic
    /// alert instead of silently dropping.
    pub fn decode(raw: Option<&[u8]>) -> Self {
        let Some(bytes) = raw else {
            return Self::default();
        };
        match serde_json::from_slice(bytes) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("undecodable push payload ({err}), using defaults");
                Self::default()
            }
        }
    }

    /// The sender name carried in `data`, if any.
    pub fn sender_name(&self) -> Option<&str> {
        self.data.as_ref()?.get("senderName")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_none_is_default() {
        assert_eq!(PushPayload::decode(None), PushPayload::default());
    }

    #[test]
    fn decode_garbage_is_default() {
        let payload = PushPayload::decode(Some(b"not json at all"));
        assert_eq!(payload, PushPayload::default());
    }

    #[test]
    fn decode_empty_object() {
        let payload = PushPayload::decode(Some(b"{}"));
        assert_eq!(payload, PushPayload::default());
    }

    #[test]
    fn decode_full_payload() {
        let raw = br#"{
            "title": "New message from Ada",
            "body": "See you at 5",
            "data": {"chatId": "c1", "senderId": "u7", "senderName": "Ada"},
            "tag": "msg",
            "actions": [{"action": "open", "title": "Open"}, {"action": "close", "title": "Dismiss"}]
        }"#;
        let payload = PushPayload::decode(Some(raw));
        assert_eq!(payload.title.as_deref(), Some("New message from Ada"));
        assert_eq!(payload.sender_name(), Some("Ada"));
        assert_eq!(payload.actions.len(), 2);
        assert_eq!(payload.actions[1].action, "close");
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let payload = PushPayload::decode(Some(br#"{"title": "t", "vibrate": [500, 100]}"#));
        assert_eq!(payload.title.as_deref(), Some("t"));
    }
}
