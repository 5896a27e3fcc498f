use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};
use crate::validation::Violation;

/// Error kinds for Docket operations.
///
/// Each kind maps to one failure category so callers (usually an API layer)
/// can translate it to a response without inspecting messages.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::errors::{DocketError, ErrorKind, DocketResult};
///
/// fn example() -> DocketResult<()> {
///     Err(DocketError::new("Product not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Input failed schema constraints; the error carries every violation
    ValidationError,
    /// No active document matched the targeted id
    NotFound,
    /// A uniqueness rule would be violated
    Conflict,
    /// The store could not be reached within the configured timeout
    StorageUnavailable,
    /// The initial connection to the store could not be established
    ConnectionError,
    /// A filter could not be built or evaluated
    FilterError,
    /// The provided id is empty or malformed
    InvalidId,
    /// The operation is not valid for the targeted data
    InvalidOperation,
    /// A configuration value is missing or malformed
    ConfigError,
    /// Error mapping a typed entity to or from a document
    ObjectMappingError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::Conflict => write!(f, "Conflict"),
            ErrorKind::StorageUnavailable => write!(f, "Storage unavailable"),
            ErrorKind::ConnectionError => write!(f, "Connection error"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::ConfigError => write!(f, "Configuration error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Docket error type.
///
/// `DocketError` carries a message, a kind, an optional cause and, for
/// validation failures, the complete list of violations found.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::errors::{DocketError, ErrorKind};
///
/// let err = DocketError::new("Product not found", ErrorKind::NotFound);
///
/// let cause = DocketError::new("pool exhausted", ErrorKind::StorageUnavailable);
/// let err = DocketError::new_with_cause("Failed to list products", ErrorKind::StorageUnavailable, cause);
/// ```
#[derive(Clone)]
pub struct DocketError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocketError>>,
    violations: Vec<Violation>,
    backtrace: Atomic<Backtrace>,
}

impl DocketError {
    /// Creates a new `DocketError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocketError {
            message: message.to_string(),
            error_kind,
            cause: None,
            violations: Vec::new(),
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `DocketError` with a cause error.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DocketError) -> Self {
        DocketError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            violations: Vec::new(),
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a validation error carrying every violation found.
    ///
    /// The message lists all violations so that a log line is useful on its own.
    pub fn validation(violations: Vec<Violation>) -> Self {
        let summary = violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        DocketError {
            message: format!("Validation failed: {}", summary),
            error_kind: ErrorKind::ValidationError,
            cause: None,
            violations,
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DocketError> {
        self.cause.as_deref()
    }

    /// Violations reported by the validation layer. Empty for other kinds.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation names the given field.
    pub fn has_violation_for(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field() == field)
    }

    pub fn is_not_found(&self) -> bool {
        self.error_kind == ErrorKind::NotFound
    }

    pub fn is_validation(&self) -> bool {
        self.error_kind == ErrorKind::ValidationError
    }

    pub fn is_storage_unavailable(&self) -> bool {
        self.error_kind == ErrorKind::StorageUnavailable
    }
}

impl Display for DocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for DocketError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Docket operations.
pub type DocketResult<T> = Result<T, DocketError>;

impl de::Error for DocketError {
    fn custom<T: Display>(msg: T) -> Self {
        DocketError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl ser::Error for DocketError {
    fn custom<T: Display>(msg: T) -> Self {
        DocketError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::num::ParseIntError> for DocketError {
    fn from(err: std::num::ParseIntError) -> Self {
        DocketError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::ConfigError,
        )
    }
}

impl From<regex::Error> for DocketError {
    fn from(err: regex::Error) -> Self {
        DocketError::new(
            &format!("Invalid regex pattern: {}", err),
            ErrorKind::FilterError,
        )
    }
}

impl From<serde_json::Error> for DocketError {
    fn from(err: serde_json::Error) -> Self {
        DocketError::new(
            &format!("JSON mapping error: {}", err),
            ErrorKind::ObjectMappingError,
        )
    }
}

impl From<String> for DocketError {
    fn from(msg: String) -> Self {
        DocketError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DocketError {
    fn from(msg: &str) -> Self {
        DocketError::new(msg, ErrorKind::InternalError)
    }
}
