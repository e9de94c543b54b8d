//! # Error Handling
//!
//! Two layers of errors live here:
//!
//! - [`DataTablesError`]: what the pipeline itself returns. Configuration mistakes
//!   (unknown or duplicate column names, a base query whose columns cannot be
//!   discovered) are raised immediately from the configuring call. Database failures
//!   abort the current invocation and are never retried.
//! - [`ApiError`]: the HTTP-facing error. It maps to a status code, logs internal
//!   details through `tracing` and only ever sends a sanitised message to the client.
//!
//! ```rust,ignore
//! async fn users(
//!     State(db): State<DatabaseConnection>,
//!     params: RequestParams,
//! ) -> Result<DataTablesResponse, ApiError> {
//!     let mut table = DataTables::new(&db, params);
//!     table.query("SELECT id, name, email FROM users")?;
//!     Ok(table.generate().await?)
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while configuring or running a [`DataTables`](crate::DataTables) pipeline.
#[derive(Error, Debug)]
pub enum DataTablesError {
    /// A column name passed to `edit`, `hide` or `get` is not defined.
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// A positional lookup referenced a column outside the defined range.
    #[error("Column index {index} out of range ({len} columns defined)")]
    IndexOutOfRange { index: i64, len: usize },

    /// A column with this name is already defined.
    #[error("Column '{0}' is already defined")]
    DuplicateColumnName(String),

    /// The base query's select list could not be turned into column names.
    #[error("Unsupported select list: {0}")]
    UnsupportedSelect(String),

    /// `add`/`edit`/`hide`/`generate` was called before `query`.
    #[error("No base query has been defined")]
    QueryNotDefined,

    /// Any failure from the database collaborator.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataTablesError {
    /// True for mistakes made while defining the table (as opposed to runtime failures).
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ColumnNotFound(_)
                | Self::IndexOutOfRange { .. }
                | Self::DuplicateColumnName(_)
                | Self::UnsupportedSelect(_)
                | Self::QueryNotDefined
        )
    }
}

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - the request could not be decoded
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 Internal Server Error with optional details
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// Configuration errors are programming mistakes on the server side, so they are
/// reported as 500 with the detail kept in the logs.
impl From<DataTablesError> for ApiError {
    fn from(err: DataTablesError) -> Self {
        match err {
            DataTablesError::Database(db_err) => Self::database(db_err),
            other => Self::internal("Failed to build table data", Some(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request() {
        let err = ApiError::bad_request("Invalid query string");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Invalid query string");
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let err = ApiError::database(DbErr::Custom("no such table: users".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "A database error occurred");
        assert!(!err.to_string().contains("users"));
    }

    #[test]
    fn test_configuration_error_becomes_internal() {
        let api_err: ApiError = DataTablesError::ColumnNotFound("nope".to_string()).into();
        assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.user_message(), "Failed to build table data");
    }

    #[test]
    fn test_pipeline_database_error_conversion() {
        let err: DataTablesError = DbErr::Custom("boom".to_string()).into();
        assert!(!err.is_configuration());
        let api_err: ApiError = err.into();
        assert!(matches!(api_err, ApiError::Database { .. }));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(DataTablesError::DuplicateColumnName("id".into()).is_configuration());
        assert!(DataTablesError::IndexOutOfRange { index: 9, len: 3 }.is_configuration());
        assert!(DataTablesError::QueryNotDefined.is_configuration());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DataTablesError::ColumnNotFound("email".into()).to_string(),
            "Column 'email' not found"
        );
        assert_eq!(
            DataTablesError::IndexOutOfRange { index: -1, len: 2 }.to_string(),
            "Column index -1 out of range (2 columns defined)"
        );
    }

    #[test]
    fn test_error_trait() {
        let err = ApiError::bad_request("Test error");
        let _: &dyn std::error::Error = &err;
    }
}
