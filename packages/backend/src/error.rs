//! Error types for the backend layer.
//!
//! Errors at this level are about the physical store only: it could not be
//! opened, could not be committed, or does not offer an operation. Data
//! quality problems (a stored string that does not parse) are not errors
//! here - the orchestrator absorbs those on its read path.

/// Errors raised by a backend adapter.
#[derive(Debug)]
pub enum BackendError {
    /// The underlying store could not be opened, read, written or committed.
    ///
    /// Use this for file I/O errors, a corrupt backing document, a platform
    /// store that refused a commit, etc.
    Unavailable(Box<dyn std::error::Error + Send + Sync>),

    /// The operation is not supported by this backend.
    ///
    /// For example, `remove` on a write-once store.
    NotSupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },

    /// The key cannot be represented by this backend.
    InvalidKey {
        /// The offending key.
        key: String,
        /// Why the backend rejected it.
        message: String,
    },
}

impl BackendError {
    /// Shorthand for an `Unavailable` error carrying only a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        let message: String = message.into();
        BackendError::Unavailable(message.into())
    }

    /// Shorthand for a `NotSupported` error.
    pub fn not_supported(operation: &'static str) -> Self {
        BackendError::NotSupported { operation }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Unavailable(e) => write!(f, "backend unavailable: {}", e),
            BackendError::NotSupported { operation } => {
                write!(f, "operation not supported: {}", operation)
            }
            BackendError::InvalidKey { key, message } => {
                write!(f, "invalid key '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Unavailable(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Unavailable(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn error_display_works() {
        let e = BackendError::not_supported("remove");
        assert_eq!(format!("{}", e), "operation not supported: remove");

        let e = BackendError::InvalidKey {
            key: "a/b".to_string(),
            message: "separator not allowed".to_string(),
        };
        assert!(format!("{}", e).contains("a/b"));
        assert!(format!("{}", e).contains("separator not allowed"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Unavailable(_)));
        assert!(StdError::source(&err).is_some());
        assert!(format!("{}", err).contains("read-only"));
    }

    #[test]
    fn unavailable_from_message() {
        let err = BackendError::unavailable("disk full");
        assert_eq!(format!("{}", err), "backend unavailable: disk full");
    }

    #[test]
    fn not_supported_has_no_source() {
        let err = BackendError::not_supported("keys");
        assert!(StdError::source(&err).is_none());
    }
}
