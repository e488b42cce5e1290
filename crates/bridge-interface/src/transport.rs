use crate::{BridgeReply, BridgeRequest};

/// A transport-level failure: the peer context is gone or never answered.
///
/// Callers must treat this as "unknown state, assume not progressed". It is
/// deliberately distinct from [`crate::Failure`], which is a well-formed
/// answer describing an in-protocol failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("target context is gone: {0}")]
    ContextGone(String),
    #[error("no response from peer")]
    NoResponse,
}

/// The page side of the bridge. One implementation per host environment;
/// the coordinator crate ships an in-process one for tests and the
/// simulated demo.
#[async_trait::async_trait]
pub trait BridgeTransport: Send + Sync {
    async fn request(&self, request: BridgeRequest) -> Result<BridgeReply, TransportError>;

    /// Fire-and-forget send for the actions that take no reply.
    async fn notify(&self, request: BridgeRequest) {
        let _ = self.request(request).await;
    }
}
