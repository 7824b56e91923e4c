//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)     Elapsed (tokio::time)                  │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── kind() = Validation / RecordNotFound / EditConflict          │
//! │       │           → caller branches on it                              │
//! │       │                                                                 │
//! │       └── kind() = StorageFault / TimeoutFault                         │
//! │                   → PublicError with a generic message                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use catalog_core::ValidationErrors;
use serde::Serialize;
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input failed validation; nothing was sent to storage.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist (or is < 1)
    /// - Row was deleted concurrently
    /// - A review's product doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The row exists but moved past the version the caller read.
    ///
    /// ## Recovery
    /// Re-fetch, re-apply the change, retry the update.
    #[error("{entity} {id} was modified concurrently (expected version {version})")]
    EditConflict {
        entity: String,
        id: i64,
        version: i64,
    },

    /// The operation did not finish within the query timeout.
    ///
    /// For writes the outcome is unknown; re-`get` to find out.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error (decode failures, I/O, ...).
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// What the caller is expected to do about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed input (400).
    Validation,
    /// Identity doesn't resolve to a live row (404).
    RecordNotFound,
    /// Stale version (409).
    EditConflict,
    /// Unexpected storage failure (500).
    StorageFault,
    /// Timeout elapsed (500 / 504).
    TimeoutFault,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates an EditConflict error.
    pub fn edit_conflict(entity: impl Into<String>, id: i64, version: i64) -> Self {
        DbError::EditConflict {
            entity: entity.into(),
            id,
            version,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Validation(_) => ErrorKind::Validation,
            DbError::NotFound { .. } => ErrorKind::RecordNotFound,
            DbError::EditConflict { .. } => ErrorKind::EditConflict,
            DbError::Timeout { .. } => ErrorKind::TimeoutFault,
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorKind::StorageFault,
        }
    }

    /// True for outcomes callers branch on rather than report.
    pub fn is_expected(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::RecordNotFound | ErrorKind::EditConflict
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::RecordNotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::EditConflict
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Public Error
// =============================================================================

/// What an external consumer is allowed to see.
///
/// ## Serialization
/// ```json
/// {
///   "code": "RECORD_NOT_FOUND",
///   "message": "Review not found: 42"
/// }
/// ```
/// Faults carry a generic message; the internal text only goes to the log.
#[derive(Debug, Clone, Serialize)]
pub struct PublicError {
    pub code: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}

impl From<DbError> for PublicError {
    fn from(err: DbError) -> Self {
        let code = err.kind();
        match err {
            DbError::Validation(errors) => PublicError {
                code,
                message: "The request failed validation".to_string(),
                fields: Some(errors),
            },
            DbError::NotFound { .. } => PublicError {
                code,
                message: err.to_string(),
                fields: None,
            },
            DbError::EditConflict { entity, id, .. } => PublicError {
                code,
                message: format!(
                    "Unable to update {} {} due to an edit conflict, please try again",
                    entity, id
                ),
                fields: None,
            },
            DbError::Timeout { operation, after } => {
                tracing::error!(operation, ?after, "Store operation timed out");
                PublicError {
                    code,
                    message: "The server took too long to respond".to_string(),
                    fields: None,
                }
            }
            other => {
                tracing::error!(error = %other, "Store operation failed");
                PublicError {
                    code,
                    message: "The server encountered a problem and could not process the request"
                        .to_string(),
                    fields: None,
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ValidationError;

    #[test]
    fn test_kinds() {
        assert_eq!(DbError::not_found("Product", 3).kind(), ErrorKind::RecordNotFound);
        assert_eq!(
            DbError::edit_conflict("Review", 3, 2).kind(),
            ErrorKind::EditConflict
        );
        assert_eq!(
            DbError::Timeout {
                operation: "insert",
                after: Duration::from_secs(3)
            }
            .kind(),
            ErrorKind::TimeoutFault
        );
        assert_eq!(DbError::PoolExhausted.kind(), ErrorKind::StorageFault);
        assert!(DbError::not_found("Product", 3).is_expected());
        assert!(!DbError::Internal("boom".to_string()).is_expected());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_public_error_hides_fault_text() {
        let public = PublicError::from(DbError::QueryFailed(
            "no such column: secret_internal".to_string(),
        ));
        assert_eq!(public.code, ErrorKind::StorageFault);
        assert!(!public.message.contains("secret_internal"));
    }

    #[test]
    fn test_public_error_keeps_not_found_text() {
        let public = PublicError::from(DbError::not_found("Review", 42));
        assert_eq!(public.message, "Review not found: 42");

        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["code"], "RECORD_NOT_FOUND");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_public_error_lists_fields() {
        let errors = ValidationErrors::from(ValidationError::Required {
            field: "author".to_string(),
        });
        let public = PublicError::from(DbError::from(errors));
        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["code"], "VALIDATION");
        assert_eq!(json["fields"]["author"], "author must be provided");
    }
}
