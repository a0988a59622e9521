//! Transport errors between contexts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Receiving end does not exist: {0}")]
    ContextGone(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Channel closed")]
    Closed,

    #[error("Malformed envelope: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_gone_error() {
        let err = TransportError::ContextGone("tab 7".to_string());
        let display = err.to_string();
        assert!(display.contains("does not exist"));
        assert!(display.contains("tab 7"));
    }

    #[test]
    fn test_send_failed_error() {
        let err = TransportError::SendFailed("hub mailbox full".to_string());
        assert!(err.to_string().contains("Send failed"));
    }

    #[test]
    fn test_closed_error() {
        assert!(TransportError::Closed.to_string().contains("closed"));
    }

    #[test]
    fn test_malformed_error() {
        let err = TransportError::Malformed("missing action".to_string());
        assert!(err.to_string().contains("missing action"));
    }
}
