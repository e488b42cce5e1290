use std::sync::{Arc, Mutex};

use lectern_bridge_interface::{WindowMessage, WindowSink};
use tokio::sync::mpsc::UnboundedSender;

/// Binds the frame's one-way window channel to the session currently
/// entitled to it.
///
/// The privileged side emits into the router for as long as it lives; the
/// root actor rebinds the target at session start and unbinds it at
/// teardown, so messages from a superseded capture are dropped instead of
/// being delivered to a listener that no longer owns them.
#[derive(Clone, Default)]
pub struct WindowRouter {
    target: Arc<Mutex<Option<UnboundedSender<WindowMessage>>>>,
}

impl WindowRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, target: UnboundedSender<WindowMessage>) {
        *self.target.lock().unwrap() = Some(target);
    }

    pub fn unbind(&self) {
        *self.target.lock().unwrap() = None;
    }
}

impl WindowSink for WindowRouter {
    fn emit(&self, message: WindowMessage) {
        if let Some(target) = self.target.lock().unwrap().as_ref() {
            let _ = target.send(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use lectern_bridge_interface::TranscriptProgress;

    use super::*;

    #[test]
    fn unbound_router_drops_messages() {
        let router = WindowRouter::new();
        router.emit(WindowMessage::TranscriptProgress(
            TranscriptProgress::started(),
        ));
    }

    #[test]
    fn rebinding_redirects_messages() {
        let router = WindowRouter::new();
        let (tx1, mut rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, mut rx2) = tokio::sync::mpsc::unbounded_channel();

        router.bind(tx1);
        router.emit(WindowMessage::TranscriptProgress(
            TranscriptProgress::started(),
        ));

        router.bind(tx2);
        router.emit(WindowMessage::TranscriptProgress(
            TranscriptProgress::started(),
        ));

        assert!(rx1.try_recv().is_ok());
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }
}
