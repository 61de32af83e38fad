//! Error types for kiqforge operations.

use thiserror::Error;

/// Result type used throughout kiqforge.
pub type KiqResult<T> = Result<T, KiqError>;

/// Main error type for kiqforge operations.
///
/// Every dispatch call ends either with a job id or with exactly one of
/// these variants.
#[derive(Error, Debug)]
pub enum KiqError {
    /// Invalid dispatcher setup, raised at registration time
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// A job argument or payload cannot be represented as JSON
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delayed dispatch was requested with a non-positive delay
    #[error("Invalid delay of {delay_secs} seconds: delayed jobs need a strictly positive delay")]
    InvalidDelay {
        /// The rejected delay in seconds
        delay_secs: f64,
    },

    /// The store failed, timed out or answered unexpectedly
    #[error("Store error: {message}")]
    Store {
        /// Error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Coarse classification of a [`KiqError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`KiqError::Configuration`]
    Configuration,
    /// See [`KiqError::Serialization`]
    Serialization,
    /// See [`KiqError::InvalidDelay`]
    InvalidDelay,
    /// See [`KiqError::Store`]
    Store,
}

impl KiqError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error without an underlying cause
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new store error
    pub fn store<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a store error that has no underlying cause
    pub fn store_message(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::InvalidDelay { .. } => ErrorKind::InvalidDelay,
            Self::Store { .. } => ErrorKind::Store,
        }
    }
}

impl From<serde_json::Error> for KiqError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}

#[cfg(feature = "redis-connector")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis-connector")))]
impl From<redis::RedisError> for KiqError {
    fn from(error: redis::RedisError) -> Self {
        Self::store(format!("Redis error: {}", error), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(KiqError::config("dup").kind(), ErrorKind::Configuration);
        assert_eq!(KiqError::serialization("nan").kind(), ErrorKind::Serialization);
        assert_eq!(
            KiqError::InvalidDelay { delay_secs: 0.0 }.kind(),
            ErrorKind::InvalidDelay
        );
        assert_eq!(KiqError::store_message("down").kind(), ErrorKind::Store);
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: KiqError = json_error.into();
        assert_eq!(error.kind(), ErrorKind::Serialization);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_messages() {
        let error = KiqError::config("queue 'urgent' registered twice");
        assert_eq!(
            error.to_string(),
            "Configuration error: queue 'urgent' registered twice"
        );
    }
}
