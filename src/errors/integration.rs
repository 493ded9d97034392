//! Errors raised while talking to external source-control providers.

use thiserror::Error;

use super::CoreError;

#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Provider returned a non-success status with an error body
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Request never completed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Invalid repository name '{0}', expected owner/name")]
    InvalidRepositoryName(String),
}

impl From<IntegrationError> for CoreError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::InvalidRepositoryName(_) => CoreError::validation(err.to_string()),
            IntegrationError::MalformedResponse(_) => {
                CoreError::internal("Unexpected response from GitHub").with_source(err)
            }
            // Upstream details are logged by the caller, not returned.
            IntegrationError::Upstream { .. } | IntegrationError::Transport(_) => {
                CoreError::unavailable("GitHub request failed").with_source(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn upstream_errors_are_generic() {
        let err: CoreError = IntegrationError::Upstream {
            status: 404,
            message: "Not Found: secret-repo".into(),
        }
        .into();
        assert_eq!(err.kind(), CoreErrorKind::Unavailable);
        assert!(!err.message().contains("secret-repo"));
    }

    #[test]
    fn malformed_responses_are_fatal() {
        let err: CoreError = IntegrationError::MalformedResponse("missing id".into()).into();
        assert_eq!(err.kind(), CoreErrorKind::Internal);
    }
}
