//! Error types for player pooling
use thiserror::Error;

/// Result type for pool and provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the pool and provider.
///
/// Lookup misses are not errors: they are reported as `None` by the
/// operations that can miss.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied argument was rejected
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// The error message
        message: String,
    },

    /// The pool cannot hold any more players
    #[error("Pool capacity exhausted: max_size is {max_size}")]
    CapacityExhausted {
        /// Maximum pool size
        max_size: usize,
    },

    /// The creator failed to manufacture a player
    #[error("Player creation failed: {reason}")]
    Creation {
        /// The failure reason
        reason: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Provider configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration {
        /// The error message
        message: String,
    },
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a creation error without an underlying source
    pub fn creation<S: Into<String>>(reason: S) -> Self {
        Self::Creation {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a creation error wrapping the engine's own error
    pub fn creation_with_source<S, E>(reason: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Creation {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error is retryable
    ///
    /// Only engine-side creation failures may succeed on a later attempt;
    /// argument, capacity and configuration errors are fixed by the caller.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Creation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::CapacityExhausted { max_size: 0 };
        assert_eq!(err.to_string(), "Pool capacity exhausted: max_size is 0");

        let err = Error::invalid_argument("key must not be empty");
        assert_eq!(err.to_string(), "Invalid argument: key must not be empty");
    }

    #[test]
    fn only_creation_is_retryable() {
        assert!(Error::creation("decoder busy").is_retryable());
        assert!(!Error::invalid_argument("x").is_retryable());
        assert!(!Error::configuration("x").is_retryable());
        assert!(!Error::CapacityExhausted { max_size: 0 }.is_retryable());
    }

    #[test]
    fn creation_keeps_source() {
        let io = std::io::Error::other("no codec");
        let err = Error::creation_with_source("engine init", io);
        let source = std::error::Error::source(&err).expect("source should be kept");
        assert_eq!(source.to_string(), "no codec");
    }
}
