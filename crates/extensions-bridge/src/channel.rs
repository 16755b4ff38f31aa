//! Correlated request/response channel between the two agents.
//!
//! Each request carries a [`RequestId`]; the client keeps a pending slot per id and gives
//! up after the configured timeout, so a vanished counterpart never hangs the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use keyfill_core_types::RequestId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::protocol::{PageCommand, Reply, VaultRequest};
use crate::router::Router;

/// Stand-in deadline for timeouts too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub req_id: RequestId,
    pub message: Value,
    pub expects_reply: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    pub req_id: RequestId,
    pub reply: Reply,
}

/// Events emitted by the client side to observers.
#[derive(Clone, Debug)]
pub enum BridgeEvent {
    RequestSent { req_id: RequestId, action: String },
    ReplyReceived { req_id: RequestId, success: bool },
    Unanswered { req_id: RequestId, action: String },
    LateReply { req_id: RequestId },
}

pub type BridgeEventBus = broadcast::Sender<BridgeEvent>;

/// What the page agent needs from the vault side.
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// Send a request and wait, bounded, for its single reply.
    async fn request(&self, request: VaultRequest) -> Result<Reply, BridgeError>;

    /// Send a request whose reply is not wanted.
    async fn notify(&self, request: VaultRequest) -> Result<(), BridgeError>;
}

type PendingMap = DashMap<RequestId, oneshot::Sender<Reply>>;

pub struct BridgeClient {
    outbound: mpsc::Sender<RequestEnvelope>,
    pending: Arc<PendingMap>,
    timeout: Duration,
    events: BridgeEventBus,
    reader: JoinHandle<()>,
}

/// Vault-side end of the channel.
pub struct BridgeEndpoint {
    requests: mpsc::Receiver<RequestEnvelope>,
    replies: mpsc::Sender<ReplyEnvelope>,
}

/// Create a connected client/endpoint pair. Must be called inside a Tokio runtime.
pub fn channel(config: &BridgeConfig) -> (BridgeClient, BridgeEndpoint) {
    let capacity = config.queue_capacity.max(1);
    let (request_tx, request_rx) = mpsc::channel(capacity);
    let (reply_tx, reply_rx) = mpsc::channel(capacity);
    let (events, _) = broadcast::channel(capacity);
    let pending: Arc<PendingMap> = Arc::new(DashMap::new());

    let reader = tokio::spawn(read_replies(reply_rx, Arc::clone(&pending), events.clone()));

    (
        BridgeClient {
            outbound: request_tx,
            pending,
            timeout: config.request_timeout(),
            events,
            reader,
        },
        BridgeEndpoint {
            requests: request_rx,
            replies: reply_tx,
        },
    )
}

async fn read_replies(
    mut replies: mpsc::Receiver<ReplyEnvelope>,
    pending: Arc<PendingMap>,
    events: BridgeEventBus,
) {
    while let Some(envelope) = replies.recv().await {
        match pending.remove(&envelope.req_id) {
            Some((req_id, slot)) => {
                let _ = events.send(BridgeEvent::ReplyReceived {
                    req_id,
                    success: envelope.reply.success,
                });
                let _ = slot.send(envelope.reply);
            }
            None => {
                debug!(target: "extensions-bridge", req_id = %envelope.req_id, "dropping late reply");
                let _ = events.send(BridgeEvent::LateReply {
                    req_id: envelope.req_id,
                });
            }
        }
    }
    // Endpoint gone: release every waiter so they observe ChannelClosed.
    pending.clear();
}

impl BridgeClient {
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Send an arbitrary JSON message and wait for the reply.
    ///
    /// The timeout covers the whole round trip, including waiting for room in a full
    /// outbound queue.
    pub async fn call_raw(&self, message: Value) -> Result<Reply, BridgeError> {
        let action = action_name(&message);
        let req_id = RequestId::new();
        let deadline = self.deadline();
        let (slot, waiter) = oneshot::channel();
        self.pending.insert(req_id, slot);

        let envelope = RequestEnvelope {
            req_id,
            message,
            expects_reply: true,
        };
        match tokio::time::timeout_at(deadline, self.outbound.send(envelope)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                self.pending.remove(&req_id);
                return Err(BridgeError::ChannelClosed);
            }
            Err(_) => {
                self.pending.remove(&req_id);
                return Err(self.unanswered(req_id, action));
            }
        }
        let _ = self.events.send(BridgeEvent::RequestSent {
            req_id,
            action: action.clone(),
        });

        match tokio::time::timeout_at(deadline, waiter).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(BridgeError::ChannelClosed),
            Err(_) => {
                self.pending.remove(&req_id);
                Err(self.unanswered(req_id, action))
            }
        }
    }

    /// Fire-and-forget send, bounded by the same timeout as a request.
    pub async fn notify_raw(&self, message: Value) -> Result<(), BridgeError> {
        let action = action_name(&message);
        let req_id = RequestId::new();
        let envelope = RequestEnvelope {
            req_id,
            message,
            expects_reply: false,
        };
        match tokio::time::timeout_at(self.deadline(), self.outbound.send(envelope)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(BridgeError::ChannelClosed),
            Err(_) => Err(self.unanswered(req_id, action)),
        }
    }

    fn deadline(&self) -> Instant {
        let now = Instant::now();
        now.checked_add(self.timeout).unwrap_or_else(|| now + FAR_FUTURE)
    }

    fn unanswered(&self, req_id: RequestId, action: String) -> BridgeError {
        warn!(target: "extensions-bridge", %req_id, %action, "request unanswered");
        let _ = self.events.send(BridgeEvent::Unanswered {
            req_id,
            action: action.clone(),
        });
        BridgeError::Unanswered {
            req_id,
            action,
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl VaultClient for BridgeClient {
    async fn request(&self, request: VaultRequest) -> Result<Reply, BridgeError> {
        let message =
            serde_json::to_value(&request).map_err(|err| BridgeError::Encode(err.to_string()))?;
        self.call_raw(message).await
    }

    async fn notify(&self, request: VaultRequest) -> Result<(), BridgeError> {
        let message =
            serde_json::to_value(&request).map_err(|err| BridgeError::Encode(err.to_string()))?;
        self.notify_raw(message).await
    }
}

impl BridgeEndpoint {
    /// Answer requests with `router` until the client side goes away.
    pub fn serve(self, router: Arc<Router>) -> JoinHandle<()> {
        let BridgeEndpoint {
            mut requests,
            replies,
        } = self;
        tokio::spawn(async move {
            while let Some(envelope) = requests.recv().await {
                let router = Arc::clone(&router);
                let replies = replies.clone();
                tokio::spawn(async move {
                    let Some(reply) = router.dispatch(&envelope.message).await else {
                        return;
                    };
                    if !envelope.expects_reply {
                        debug!(
                            target: "extensions-bridge",
                            req_id = %envelope.req_id,
                            success = reply.success,
                            "notification handled"
                        );
                        return;
                    }
                    let envelope = ReplyEnvelope {
                        req_id: envelope.req_id,
                        reply,
                    };
                    if replies.send(envelope).await.is_err() {
                        debug!(target: "extensions-bridge", "client went away before reply");
                    }
                });
            }
        })
    }

    /// Split into raw halves for callers that drive the endpoint themselves.
    pub fn into_parts(
        self,
    ) -> (
        mpsc::Receiver<RequestEnvelope>,
        mpsc::Sender<ReplyEnvelope>,
    ) {
        (self.requests, self.replies)
    }
}

fn action_name(message: &Value) -> String {
    message
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or("<none>")
        .to_string()
}

/// Sender half of the vault → page push channel.
pub type PushSender = mpsc::Sender<PageCommand>;

pub fn push_channel(capacity: usize) -> (PushSender, mpsc::Receiver<PageCommand>) {
    mpsc::channel(capacity.max(1))
}
