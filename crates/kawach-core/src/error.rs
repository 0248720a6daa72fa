//! Error types for the Kawach core library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all drill, content and progress operations.
#[derive(Error, Debug)]
pub enum KawachError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A scenario definition failed validation before a run could start
    #[error("Invalid scenario '{scenario_id}': {reason}")]
    InvalidScenario { scenario_id: String, reason: String },
    /// No scenario with the given ID exists in the content store
    #[error("Scenario '{id}' not found")]
    ScenarioNotFound { id: String },
    /// No assignment with the given ID exists
    #[error("Assignment '{id}' not found")]
    AssignmentNotFound { id: String },
    /// Results were requested from a run that has not completed
    #[error("Drill run has not completed yet")]
    NotCompleted,
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// A blocking database task panicked or was cancelled
    #[error("Background task failed: {source}")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> KawachError {
        KawachError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> KawachError {
        KawachError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl KawachError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a scenario validation error.
    pub fn invalid_scenario(scenario_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScenario {
            scenario_id: scenario_id.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a join failure from a blocking database task.
    pub(crate) fn join(source: tokio::task::JoinError) -> Self {
        Self::TaskFailed { source }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| KawachError::database(message).with_source(e))
    }
}

/// Result type alias for Kawach operations
pub type Result<T> = std::result::Result<T, KawachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_scenario_message() {
        let err = KawachError::invalid_scenario("fire-drill", "step 2 has no correct option");
        assert_eq!(
            err.to_string(),
            "Invalid scenario 'fire-drill': step 2 has no correct option"
        );
    }

    #[test]
    fn test_invalid_input_builder() {
        let err = KawachError::invalid_input("answers").with_reason("expected 3 answers, got 2");
        assert!(matches!(err, KawachError::InvalidInput { ref field, .. } if field == "answers"));
        assert!(err.to_string().contains("expected 3 answers"));
    }

    #[test]
    fn test_db_context_wraps_source() {
        let result: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::QueryReturnedNoRows);
        let err = result.db_context("Failed to load learner").unwrap_err();
        assert!(err.to_string().starts_with("Database error: Failed to load learner"));
    }

    #[tokio::test]
    async fn test_panicked_task_is_task_failure() {
        let join_error = tokio::task::spawn_blocking(|| -> u32 { panic!("worker crashed") })
            .await
            .unwrap_err();
        let err = KawachError::join(join_error);
        assert!(matches!(err, KawachError::TaskFailed { .. }));
        assert!(err.to_string().starts_with("Background task failed"));
    }
}
