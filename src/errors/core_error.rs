use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use sea_orm::DbErr;

/// Broad failure categories shared by every service.
///
/// Everything except `Internal` is recoverable: the API layer reports it
/// inside the mutation payload instead of failing the request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    NotFound,
    Validation,
    Conflict,
    Forbidden,
    Unauthorized,
    Unavailable,
    Internal,
}

impl CoreErrorKind {
    pub fn is_recoverable(self) -> bool {
        !matches!(self, CoreErrorKind::Internal)
    }
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    message: String,
    fields: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            source: None,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        let entity = entity.into();
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), id.into());
        fields.insert("entity".to_string(), entity.clone());

        Self {
            kind: CoreErrorKind::NotFound,
            message: format!("{} not found", entity),
            fields: Some(fields),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Conflict, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Forbidden, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unauthorized, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    /// Wrap a store failure. The driver text stays in `source` for logs and
    /// never reaches the caller-facing message.
    pub fn database(operation: &str, err: DbErr) -> Self {
        Self::internal(format!("Database error during {}", operation)).with_source(err)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind.is_recoverable()
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<DbErr> for CoreError {
    fn from(err: DbErr) -> Self {
        CoreError::internal("Database error").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_entity_and_id() {
        let err = CoreError::not_found("Team", "t1");
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
        assert_eq!(err.message(), "Team not found");
        let fields = err.fields().expect("fields");
        assert_eq!(fields.get("entity").map(String::as_str), Some("Team"));
        assert_eq!(fields.get("id").map(String::as_str), Some("t1"));
    }

    #[test]
    fn database_errors_hide_driver_text() {
        let err = CoreError::database("archive team", DbErr::Custom("disk I/O".into()));
        assert!(!err.is_recoverable());
        assert!(!err.message().contains("disk"));
        assert!(err.source().is_some());
    }

    #[test]
    fn only_internal_is_fatal() {
        assert!(CoreError::forbidden("no").is_recoverable());
        assert!(CoreError::unavailable("down").is_recoverable());
        assert!(!CoreError::internal("boom").is_recoverable());
    }
}
