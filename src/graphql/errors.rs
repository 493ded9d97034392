use async_graphql::*;
use tracing::error;

use crate::errors::{CoreError, CoreErrorKind};

/// Error codes for structured error handling
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ErrorCode {
    /// Resource not found (404-equivalent)
    NotFound,
    /// Unauthorized access (401-equivalent)
    Unauthorized,
    /// Forbidden access (403-equivalent)
    Forbidden,
    /// Validation failed (400-equivalent)
    ValidationFailed,
    /// External service error
    ServiceError,
    /// Internal server error
    InternalError,
    /// Conflict (409-equivalent)
    Conflict,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::ServiceError => "SERVICE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Conflict => "CONFLICT",
        }
    }
}

impl From<CoreErrorKind> for ErrorCode {
    fn from(kind: CoreErrorKind) -> Self {
        match kind {
            CoreErrorKind::NotFound => ErrorCode::NotFound,
            CoreErrorKind::Validation => ErrorCode::ValidationFailed,
            CoreErrorKind::Conflict => ErrorCode::Conflict,
            CoreErrorKind::Forbidden => ErrorCode::Forbidden,
            CoreErrorKind::Unauthorized => ErrorCode::Unauthorized,
            CoreErrorKind::Unavailable => ErrorCode::ServiceError,
            CoreErrorKind::Internal => ErrorCode::InternalError,
        }
    }
}

/// Recoverable failure reported inside a mutation payload.
#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
pub struct StandardMutationError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&CoreError> for StandardMutationError {
    fn from(err: &CoreError) -> Self {
        Self {
            code: err.kind().into(),
            message: err.message().to_string(),
        }
    }
}

/// Structured error builder for consistent error handling
pub struct StructuredError;

impl StructuredError {
    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Error {
        Error::new(message.into()).extend_with(|_, e| {
            e.set("code", "UNAUTHORIZED");
        })
    }

    /// Create an "internal error"
    pub fn internal(message: impl Into<String>) -> Error {
        Error::new(message.into()).extend_with(|_, e| {
            e.set("code", "INTERNAL_ERROR");
        })
    }
}

/// Convert a service error into a GraphQL error carrying its code and fields.
pub fn core_error_to_graphql_error(err: CoreError) -> Error {
    if !err.is_recoverable() {
        match std::error::Error::source(&err) {
            Some(source) => error!("{}: {}", err.message(), source),
            None => error!("{}", err.message()),
        }
    }

    let code = ErrorCode::from(err.kind());
    let fields = err.fields().cloned();
    Error::new(err.message().to_string()).extend_with(move |_, e| {
        e.set("code", code.as_str());
        if let Some(fields) = &fields {
            for (key, value) in fields {
                e.set(key.as_str(), value.as_str());
            }
        }
    })
}

/// Route a failed operation: recoverable kinds land in the payload,
/// anything else fails the request.
pub fn payload_error(err: CoreError) -> Result<StandardMutationError> {
    if err.is_recoverable() {
        Ok(StandardMutationError::from(&err))
    } else {
        Err(core_error_to_graphql_error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_become_payload_errors() {
        let err = payload_error(CoreError::forbidden("Not team lead")).unwrap();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.message, "Not team lead");

        let err = payload_error(CoreError::unavailable("GitHub request failed")).unwrap();
        assert_eq!(err.code, ErrorCode::ServiceError);
    }

    #[test]
    fn internal_errors_fail_the_request() {
        let err = payload_error(CoreError::internal("boom")).unwrap_err();
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_unauthorized_error() {
        let error = StructuredError::unauthorized("Invalid authentication token");
        assert!(error.message.contains("Invalid"));
        assert!(error.extensions.is_some());
    }
}
