use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Invalid direction: {0}. Must be 'ja_to_en' or 'en_to_ja'")]
    InvalidDirection(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TranslateError>;

/// Failure kinds a translation backend can report.
///
/// The orchestrator matches over these instead of inspecting transport
/// details, so every backend must map its failures into this set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Connectivity(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("backend request timed out")]
    Timeout,

    /// Non-success HTTP status other than not-found or timeout.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

pub const CONNECTIVITY_MESSAGE: &str = "[翻訳エラー] Ollama に接続できません";
pub const MODEL_NOT_FOUND_MESSAGE: &str = "[翻訳エラー] モデルが見つかりません";
pub const TIMEOUT_MESSAGE: &str = "[翻訳エラー] タイムアウトしました";

impl BackendError {
    /// Text shown to the user in place of a translation.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
            BackendError::ModelNotFound(_) => MODEL_NOT_FOUND_MESSAGE.to_string(),
            BackendError::Timeout => TIMEOUT_MESSAGE.to_string(),
            BackendError::Status { message, .. } | BackendError::Other(message) => {
                message.clone()
            }
        }
    }

    /// Classify a transport-level reqwest failure.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Connectivity(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), &err.to_string())
        } else {
            BackendError::Other(err.to_string())
        }
    }

    /// Classify a non-success HTTP status. `message` is the backend's error
    /// text and is passed through for anything other than 404.
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            404 => BackendError::ModelNotFound(message.to_string()),
            408 | 504 => BackendError::Timeout,
            _ => BackendError::Status {
                status,
                message: message.to_string(),
            },
        }
    }

    /// True when the backend answered with an error status or could not be
    /// reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            BackendError::Connectivity(_)
                | BackendError::ModelNotFound(_)
                | BackendError::Status { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_fixed() {
        assert_eq!(
            BackendError::Connectivity("refused".into()).user_message(),
            CONNECTIVITY_MESSAGE
        );
        assert_eq!(
            BackendError::ModelNotFound("translategemma:12b".into()).user_message(),
            MODEL_NOT_FOUND_MESSAGE
        );
        assert_eq!(BackendError::Timeout.user_message(), TIMEOUT_MESSAGE);
    }

    #[test]
    fn test_other_passes_message_through() {
        let err = BackendError::Other("Some other error".to_string());
        assert_eq!(err.user_message(), "Some other error");
        assert_eq!(err.to_string(), "Some other error");
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            BackendError::from_status(404, "model 'x' not found"),
            BackendError::ModelNotFound(_)
        ));
        assert_eq!(BackendError::from_status(504, "gateway"), BackendError::Timeout);
        assert_eq!(
            BackendError::from_status(500, "internal"),
            BackendError::Status {
                status: 500,
                message: "internal".to_string()
            }
        );
    }

    #[test]
    fn test_status_message_passes_through() {
        let err = BackendError::from_status(503, "Connection refused");
        assert_eq!(err.user_message(), "Connection refused");
        assert!(err.is_unreachable());
        assert!(!BackendError::Timeout.is_unreachable());
        assert!(!BackendError::Other("bad json".into()).is_unreachable());
    }

    #[test]
    fn test_invalid_direction_message() {
        let err = TranslateError::InvalidDirection("fr_to_de".to_string());
        assert!(err.to_string().contains("fr_to_de"));
        assert!(err.to_string().contains("ja_to_en"));
    }
}
