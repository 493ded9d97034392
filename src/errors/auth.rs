//! Credential and bearer token failures.

use thiserror::Error;

use super::CoreError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Email/password pair did not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Authentication token has expired")]
    TokenExpired,

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("An account with this email already exists")]
    UserAlreadyExists,

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired => {
                CoreError::unauthorized(err.to_string())
            }
            AuthError::WeakPassword(_) => CoreError::validation(err.to_string()),
            AuthError::UserAlreadyExists => CoreError::conflict(err.to_string()),
            // Library errors stay in the source chain
            AuthError::Jwt(_) | AuthError::Hashing(_) => {
                CoreError::internal("Authentication subsystem failure").with_source(err)
            }
        }
    }
}
