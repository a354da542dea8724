//! Channel contract and the in-process endpoint pair.

use std::sync::{Arc, RwLock, Weak};

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::protocol::{WebViewMessage, WebViewResponse};

/// Channel error.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The remote end was torn down before responding.
    #[error("channel closed before a response arrived")]
    Closed,
    #[error("frame codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Handler receiving every inbound message on an endpoint.
///
/// Handlers are infallible by contract: failures are handled inside the
/// handler (alerts, logs) and never propagate across the channel boundary.
pub type MessageHandler =
    Arc<dyn Fn(WebViewMessage) -> BoxFuture<'static, WebViewResponse> + Send + Sync>;

/// Bidirectional, asynchronous request/response transport.
///
/// Delivery is not FIFO; each `request` resolves with the response paired to
/// that specific call, so concurrent in-flight requests never cross-resolve.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Send a message and await its paired response.
    async fn request(&self, message: WebViewMessage) -> Result<WebViewResponse, ChannelError>;

    /// Send a fire-and-forget message. Silently dropped when the remote end
    /// is already gone, which is only acceptable during session teardown.
    fn notify(&self, message: WebViewMessage);

    /// Register the single handler for inbound messages, replacing any
    /// previous one.
    fn set_handler(&self, handler: MessageHandler);
}

struct LocalEnvelope {
    message: WebViewMessage,
    /// Per-call reply slot; `None` for fire-and-forget messages.
    reply: Option<oneshot::Sender<WebViewResponse>>,
}

/// One endpoint of an in-process channel pair.
///
/// Used by embedded-panel hosts, where both sides live in the same process.
/// Each inbound message is dispatched on its own task, so a slow response
/// never delays later messages and correlation comes from the per-call
/// reply slot rather than ordering.
pub struct LocalChannel {
    tx: mpsc::UnboundedSender<LocalEnvelope>,
    handler: Arc<RwLock<Option<MessageHandler>>>,
}

impl LocalChannel {
    /// Create a connected pair of endpoints.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();

        let a = Self {
            tx: tx_b,
            handler: Arc::new(RwLock::new(None)),
        };
        let b = Self {
            tx: tx_a,
            handler: Arc::new(RwLock::new(None)),
        };

        Self::spawn_dispatch(rx_a, Arc::downgrade(&a.handler));
        Self::spawn_dispatch(rx_b, Arc::downgrade(&b.handler));

        (a, b)
    }

    fn spawn_dispatch(
        mut rx: mpsc::UnboundedReceiver<LocalEnvelope>,
        handler: Weak<RwLock<Option<MessageHandler>>>,
    ) {
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                // The owning endpoint is gone; dropping the receiver fails
                // any in-flight requests with `Closed`.
                let Some(handler_slot) = handler.upgrade() else {
                    break;
                };
                let handler = handler_slot.read().ok().and_then(|h| h.clone());
                match handler {
                    Some(handler) => {
                        tokio::spawn(async move {
                            let response = handler(envelope.message).await;
                            if let Some(reply) = envelope.reply {
                                let _ = reply.send(response);
                            }
                        });
                    }
                    None => {
                        tracing::warn!(message = ?envelope.message, "no handler registered, acking");
                        if let Some(reply) = envelope.reply {
                            let _ = reply.send(WebViewResponse::Ack);
                        }
                    }
                }
            }
        });
    }
}

#[async_trait]
impl MessageChannel for LocalChannel {
    async fn request(&self, message: WebViewMessage) -> Result<WebViewResponse, ChannelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(LocalEnvelope {
                message,
                reply: Some(reply_tx),
            })
            .map_err(|_| ChannelError::Closed)?;
        reply_rx.await.map_err(|_| ChannelError::Closed)
    }

    fn notify(&self, message: WebViewMessage) {
        if self
            .tx
            .send(LocalEnvelope {
                message,
                reply: None,
            })
            .is_err()
        {
            tracing::debug!("notify after channel teardown, dropped");
        }
    }

    fn set_handler(&self, handler: MessageHandler) {
        if let Ok(mut slot) = self.handler.write() {
            *slot = Some(handler);
        }
    }
}
