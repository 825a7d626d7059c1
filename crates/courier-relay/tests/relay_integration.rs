//! Integration tests for the courier relay.
//!
//! These tests start a real axum server on a random port and exercise the
//! fan-out endpoint end to end with a scripted sender.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use courier_relay::{
    PushSender, RelayConfig, SendFuture, SigningKeys, Subscription, spawn_relay,
};

/// A sender that records deliveries and fails for one scripted endpoint.
#[derive(Default)]
struct ScriptedSender {
    attempts: AtomicUsize,
    delivered: Mutex<Vec<String>>,
    fail_endpoint: Option<String>,
}

impl PushSender for ScriptedSender {
    fn send(&self, subscription: Subscription, _payload: String) -> SendFuture<'_> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            if self.fail_endpoint.as_deref() == Some(subscription.endpoint.as_str()) {
                return Err(format!("scripted failure for {}", subscription.endpoint));
            }
            self.delivered
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(subscription.endpoint);
            Ok(())
        })
    }
}

fn signing() -> SigningKeys {
    SigningKeys {
        public_key: "test-public".into(),
        private_key: "test-private".into(),
        contact: "mailto:test@courier.example".into(),
    }
}

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_test_server(
    sender: Arc<ScriptedSender>,
    signing_keys: Option<SigningKeys>,
) -> String {
    let config = RelayConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        signing: signing_keys,
    };
    let addr = spawn_relay(config, sender).await.unwrap();
    format!("http://{addr}")
}

fn subscription(endpoint: &str) -> serde_json::Value {
    serde_json::json!({"endpoint": endpoint, "keys": {"p256dh": "pk", "auth": "ak"}})
}

#[tokio::test]
async fn empty_recipients_is_a_400() {
    let sender = Arc::new(ScriptedSender::default());
    let base = spawn_test_server(sender.clone(), Some(signing())).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/push"))
        .json(&serde_json::json!({"senderName": "Ada", "recipients": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No recipients");
    assert_eq!(sender.attempts.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn missing_signing_keys_is_a_500() {
    let sender = Arc::new(ScriptedSender::default());
    let base = spawn_test_server(sender.clone(), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/push"))
        .json(&serde_json::json!({"recipients": [subscription("https://push.test/s1")]}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    assert_eq!(sender.attempts.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn fan_out_counts_attempted_deliveries() {
    // One of three recipients fails; the batch still reports all three.
    let sender = Arc::new(ScriptedSender {
        fail_endpoint: Some("https://push.test/s2".into()),
        ..ScriptedSender::default()
    });
    let base = spawn_test_server(sender.clone(), Some(signing())).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/push"))
        .json(&serde_json::json!({
            "chatId": "c1",
            "senderId": "u1",
            "senderName": "Ada",
            "messageText": "hi",
            "recipients": [
                subscription("https://push.test/s1"),
                subscription("https://push.test/s2"),
                subscription("https://push.test/s3"),
            ],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["sent"], 3);

    assert_eq!(sender.attempts.load(Ordering::Relaxed), 3);
    let delivered = sender.delivered.lock().unwrap();
    assert_eq!(
        *delivered,
        vec!["https://push.test/s1", "https://push.test/s3"]
    );
}

#[tokio::test]
async fn delivered_payload_decodes_on_the_agent_side() {
    struct CapturingSender(Arc<Mutex<Vec<String>>>);
    impl PushSender for CapturingSender {
        fn send(&self, _subscription: Subscription, payload: String) -> SendFuture<'_> {
            Box::pin(async move {
                self.0.lock().unwrap_or_else(|e| e.into_inner()).push(payload);
                Ok(())
            })
        }
    }

    let payloads: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let config = RelayConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        signing: Some(signing()),
    };
    let addr = spawn_relay(config, Arc::new(CapturingSender(payloads.clone())))
        .await
        .unwrap();

    reqwest::Client::new()
        .post(format!("http://{addr}/api/push"))
        .json(&serde_json::json!({
            "senderName": "Ada",
            "recipients": [subscription("https://push.test/s1")],
        }))
        .send()
        .await
        .unwrap();

    let captured = payloads.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    let decoded = courier_rs::notify::PushPayload::decode(Some(captured[0].as_bytes()));
    assert_eq!(decoded.title.as_deref(), Some("New message from Ada"));
}

#[tokio::test]
async fn non_post_method_is_a_405() {
    let sender = Arc::new(ScriptedSender::default());
    let base = spawn_test_server(sender, Some(signing())).await;

    let resp = reqwest::get(format!("{base}/api/push")).await.unwrap();
    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn options_preflight_is_a_204() {
    let sender = Arc::new(ScriptedSender::default());
    let base = spawn_test_server(sender, Some(signing())).await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/api/push"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
}
