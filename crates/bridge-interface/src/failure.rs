/// Failure taxonomy shared by every layer of the capture protocol.
///
/// Everything except `CancelledByUser` is recoverable at the orchestration
/// layer: first by per-step retries, then by reloading the affected frame.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    FrameNotFound,
    TabNotFound,
    ButtonNotFound,
    ContainerNotFound,
    CaptureFailed,
    CancelledByUser,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureKind::CancelledByUser)
    }
}

/// A structured failure payload, safe to serialise across contexts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::CancelledByUser, "Capture cancelled")
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_kebab_case() {
        let json = serde_json::to_string(&FailureKind::FrameNotFound).unwrap();
        assert_eq!(json, r#""frame-not-found""#);
        assert_eq!(FailureKind::ButtonNotFound.to_string(), "button-not-found");
    }

    #[test]
    fn only_user_cancellation_is_terminal() {
        assert!(FailureKind::CaptureFailed.is_retryable());
        assert!(FailureKind::ContainerNotFound.is_retryable());
        assert!(!FailureKind::CancelledByUser.is_retryable());
    }
}
