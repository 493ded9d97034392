//! Error types shared by services and the API layer
//!
//! # Error Categories
//!
//! - **CoreError**: the service-level error every operation returns, tagged
//!   with a [`CoreErrorKind`]
//! - **AuthError**: token and credential failures
//! - **IntegrationError**: failures talking to external providers
//!
//! Domain errors convert into `CoreError`; the GraphQL layer decides from the
//! kind whether a failure lands in the mutation payload or fails the request.

pub mod auth;
pub mod core_error;
pub mod integration;

pub use auth::AuthError;
pub use core_error::{CoreError, CoreErrorKind, CoreResult};
pub use integration::IntegrationError;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for provider calls
pub type IntegrationResult<T> = Result<T, IntegrationError>;
