//! Per-recipient push delivery.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::api::Subscription;

/// Boxed future returned by [`PushSender::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Delivers one serialized payload to one subscription endpoint.
///
/// Dyn-compatible so the relay can hold it as `Arc<dyn PushSender>` and
/// tests can swap in a counting fake.
pub trait PushSender: Send + Sync {
    fn send(&self, subscription: Subscription, payload: String) -> SendFuture<'_>;
}

/// Default TTL advertised to the push service, in seconds (4 weeks).
const PUSH_TTL_SECS: u32 = 2_419_200;

/// [`PushSender`] that POSTs the payload to the subscription endpoint.
///
/// Payload encryption for the web-push transport is out of scope here;
/// the push service integration owns it.
pub struct HttpPushSender {
    client: reqwest::Client,
}

impl HttpPushSender {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("courier-relay/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self { client })
    }
}

impl PushSender for HttpPushSender {
    fn send(&self, subscription: Subscription, payload: String) -> SendFuture<'_> {
        Box::pin(async move {
            let resp = self
                .client
                .post(&subscription.endpoint)
                .header("TTL", PUSH_TTL_SECS)
                .header("Content-Type", "application/json")
                .body(payload)
                .send()
                .await
                .map_err(|e| format!("push to {} failed: {e}", subscription.endpoint))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(format!(
                    "push service rejected {}: HTTP {status}",
                    subscription.endpoint
                ));
            }
            debug!("push accepted by {}: HTTP {status}", subscription.endpoint);
            Ok(())
        })
    }
}
