//! Error types
//!
//! Each layer owns its own error enum so callers can tell a failed write
//! apart from a no-op and a gateway failure apart from a storage failure.

use thiserror::Error;

/// Failures of the key-value store and the collections built on it
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Blocking(String),

    #[error("record '{0}' already exists")]
    DuplicateId(String),

    #[error("record '{0}' was already finished by another writer")]
    Conflict(String),
}

/// Failures of the generative-language gateway
///
/// Every variant renders the same generic message; the cause is carried in
/// the variant and logged, never shown.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to get response from AI")]
    Request(String),

    #[error("Failed to get response from AI")]
    Status { status: u16, body: String },

    #[error("Failed to get response from AI")]
    Decode(String),

    #[error("Failed to get response from AI")]
    MissingAnswer,

    #[error("Failed to get response from AI")]
    EmptyResponse,
}

/// Failures surfaced by the conversation manager
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("history actor is not running")]
    ActorUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_render_generic_message() {
        let errors = vec![
            GatewayError::Request("dns".to_string()),
            GatewayError::Status {
                status: 500,
                body: "boom".to_string(),
            },
            GatewayError::Decode("eof".to_string()),
            GatewayError::MissingAnswer,
            GatewayError::EmptyResponse,
        ];

        for error in errors {
            assert_eq!(error.to_string(), "Failed to get response from AI");
        }
    }

    #[test]
    fn test_status_body_stays_out_of_message() {
        let error = GatewayError::Status {
            status: 400,
            body: "API key not valid".to_string(),
        };
        assert!(!error.to_string().contains("API key"));
        assert!(format!("{:?}", error).contains("API key not valid"));
    }

    #[test]
    fn test_conversation_error_is_transparent_over_gateway() {
        let error: ConversationError = GatewayError::MissingAnswer.into();
        assert_eq!(error.to_string(), "Failed to get response from AI");
    }
}
