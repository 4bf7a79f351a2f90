use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("{0}")]
    Validation(String),
    #[error("Vault path not set")]
    Unbound,
    #[error("{0}")]
    InvalidTarget(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Watcher failure: {0}")]
    Watch(#[from] notify::Error),
}

impl VaultError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Message safe to hand back to an HTTP client. Internal failures are
    /// reduced to a generic string; the details only go to the log.
    pub fn public_message(&self) -> String {
        match self {
            Self::Io(_) | Self::Watch(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for VaultError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Unbound | Self::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Io(_) | Self::Watch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("[Vault] {}", self);
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.public_message()
        }))
    }
}

pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(VaultError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(VaultError::Unbound.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            VaultError::InvalidTarget("dir".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(VaultError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(VaultError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        let io = VaultError::from(std::io::Error::other("disk on fire"));
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let io = VaultError::from(std::io::Error::other("/secret/path exploded"));
        assert_eq!(io.public_message(), "Internal server error");
        assert_eq!(VaultError::Unbound.public_message(), "Vault path not set");
    }
}
