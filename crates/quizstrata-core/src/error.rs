//! Error types for quizstrata

/// Result type alias using quizstrata's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for quizstrata operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors (fatal before any record is read)
    #[error("configuration error: {0}")]
    Config(String),

    /// Text oracle failures (language id, entity extraction, POS tagging)
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Corpus stream errors (malformed source, aborted pass)
    #[error("corpus error: {0}")]
    Corpus(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML configuration parse errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new oracle error
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    /// Create a new corpus error
    pub fn corpus(msg: impl Into<String>) -> Self {
        Self::Corpus(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error should abort the whole run rather than a single record
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Oracle(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("frequency_threshold must be positive");
        assert_eq!(
            err.to_string(),
            "configuration error: frequency_threshold must be positive"
        );
    }

    #[test]
    fn test_oracle_errors_are_recoverable() {
        assert!(!Error::oracle("text too short").is_fatal());
        assert!(Error::corpus("unexpected end of array").is_fatal());
        assert!(Error::config("bad").is_fatal());
    }
}
