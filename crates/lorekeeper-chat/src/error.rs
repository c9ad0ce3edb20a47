//! Error types for the chat engine.

use lorekeeper_core::error::LorekeeperError;

/// Errors from the chat engine.
///
/// `NetworkFailure`, `MalformedResponse` and `NotFound` never reach the user
/// as-is: the orchestrator turns them into a single chat message and logs
/// the detail.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("network failure: {0}")]
    NetworkFailure(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("no item named \"{term}\" in {category}")]
    NotFound { term: String, category: String },
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("registry error: {0}")]
    Registry(String),
    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<LorekeeperError> for ChatError {
    fn from(err: LorekeeperError) -> Self {
        match err {
            LorekeeperError::Registry(msg) => ChatError::Registry(msg),
            other => ChatError::StorageError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );
        assert_eq!(
            ChatError::NetworkFailure("HTTP 503".to_string()).to_string(),
            "network failure: HTTP 503"
        );
        assert_eq!(
            ChatError::MalformedResponse("missing results".to_string()).to_string(),
            "malformed response: missing results"
        );
        assert_eq!(
            ChatError::NotFound {
                term: "fire".to_string(),
                category: "spells".to_string()
            }
            .to_string(),
            "no item named \"fire\" in spells"
        );
        assert_eq!(
            ChatError::UnknownCategory("poems".to_string()).to_string(),
            "unknown category: poems"
        );
    }

    #[test]
    fn test_from_lorekeeper_registry_error() {
        let err: ChatError = LorekeeperError::Registry("duplicate".to_string()).into();
        assert!(matches!(err, ChatError::Registry(ref m) if m == "duplicate"));
    }

    #[test]
    fn test_from_lorekeeper_storage_error() {
        let err: ChatError = LorekeeperError::Storage("disk full".to_string()).into();
        assert!(matches!(err, ChatError::StorageError(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_errors_implement_debug() {
        let dbg = format!("{:?}", ChatError::EmptyMessage);
        assert!(dbg.contains("EmptyMessage"));
    }
}
