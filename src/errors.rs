use serde::Serialize;
use thiserror::Error;

/// Errors raised by the ambient layer (configuration, persistence, host).
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::FileSystem(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", e))
    }
}

/// Failures of a single remote call made through the shared HTTP primitive.
///
/// These never leave a provider client: every `ProviderClient` method turns
/// them into an empty/`None` sentinel after logging and notifying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Session expired")]
    Unauthorized,

    #[error("No active session")]
    NoSession,

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),
}

impl ProviderError {
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ProviderError::Unauthorized | ProviderError::NoSession | ProviderError::Refresh(_)
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_remote_message() {
        let err = ProviderError::Http {
            status: 400,
            message: "invalid seed".to_string(),
        };
        assert_eq!(err.to_string(), "invalid seed");
        assert!(!err.is_auth());
        assert!(ProviderError::Unauthorized.is_auth());
    }

    #[test]
    fn test_app_error_serializes_tagged() {
        let json = serde_json::to_value(AppError::Config("bad".into())).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "bad");
    }
}
