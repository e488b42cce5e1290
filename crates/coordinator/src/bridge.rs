use std::sync::Arc;

use lectern_bridge_interface::{BridgeReply, BridgeRequest, BridgeTransport, TabId, TransportError};

use crate::ops::Coordinator;

/// In-process [`BridgeTransport`]: requests go straight to a coordinator
/// living in the same process, stamped with the page's own tab so sender
/// observation works the way a real message bus would provide it.
///
/// Used by the simulated environment and tests; a browser host would ship
/// its own transport over the extension message bus instead.
pub struct LocalBridge {
    coordinator: Arc<Coordinator>,
    sender_tab: TabId,
}

impl LocalBridge {
    pub fn new(coordinator: Arc<Coordinator>, sender_tab: TabId) -> Self {
        Self {
            coordinator,
            sender_tab,
        }
    }
}

#[async_trait::async_trait]
impl BridgeTransport for LocalBridge {
    async fn request(&self, request: BridgeRequest) -> Result<BridgeReply, TransportError> {
        Ok(self.coordinator.handle_from(self.sender_tab, request).await)
    }
}
