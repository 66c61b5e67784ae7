//! Unified error types for the reporting core.

use thiserror::Error;

/// Every failure a reporting, configuration or tuning call can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Query or connectivity failure from the store
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Human-readable entity name ("Artwork", "Artist")
        entity: &'static str,
        /// The identifier that was looked up
        id: i64,
    },

    /// A parameter is outside its accepted range
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// Filesystem failure while preparing the database location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Message shown to API consumers. Not-found errors keep the short
    /// "Artwork not found" form the admin surface expects.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound { entity, .. } => format!("{entity} not found"),
            other => other.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_public_message() {
        let err = Error::NotFound {
            entity: "Artwork",
            id: 42,
        };
        assert_eq!(err.public_message(), "Artwork not found");
        assert_eq!(err.to_string(), "Artwork not found: 42");
    }

    #[test]
    fn test_validation_message() {
        let err = Error::validation("Learning rate must be between 0 and 1");
        assert_eq!(
            err.public_message(),
            "Validation error: Learning rate must be between 0 and 1"
        );
    }
}
