mod root;

pub use root::{RootActor, RootArgs, RootMsg, SessionState, handle_page_request, spawn_root};

pub(crate) fn session_span(session_id: &str) -> tracing::Span {
    tracing::info_span!("session", session_id = %session_id)
}
