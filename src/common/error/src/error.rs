//! Core error types for Recast.

use thiserror::Error;

/// Result type alias using `RecastError`.
pub type RecastResult<T> = std::result::Result<T, RecastError>;

/// Core error type for Recast operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecastError {
    /// Type mismatch or invalid type operation.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid value provided.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Member (record field) not found on a record type.
    #[error("MemberNotFound: {0}")]
    MemberNotFound(String),

    /// A method call could not be resolved for its argument types.
    #[error("MethodResolution: {0}")]
    MethodResolution(String),

    /// Named query source is not registered with the provider.
    #[error("SourceNotFound: {0}")]
    SourceNotFound(String),

    /// Query execution error.
    #[error("ExecutionError: {0}")]
    ExecutionError(String),

    /// Invalid or unreadable configuration.
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// Internal error (bug in Recast).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl RecastError {
    /// Create a new `TypeError`.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new `ValueError`.
    pub fn value_error<S: Into<String>>(msg: S) -> Self {
        Self::ValueError(msg.into())
    }

    /// Create a new `MemberNotFound` error.
    pub fn member_not_found<S: Into<String>>(msg: S) -> Self {
        Self::MemberNotFound(msg.into())
    }

    /// Create a new `MethodResolution` error.
    pub fn method_resolution<S: Into<String>>(msg: S) -> Self {
        Self::MethodResolution(msg.into())
    }

    /// Create a new `SourceNotFound` error.
    pub fn source_not_found<S: Into<String>>(msg: S) -> Self {
        Self::SourceNotFound(msg.into())
    }

    /// Create a new `ExecutionError`.
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Create a new `ConfigError`.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a resource exhausted error (using `ExecutionError`).
    pub fn resource_exhausted<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(format!("ResourceExhausted: {}", msg.into()))
    }

    /// Whether this error describes a query that could not be built, as
    /// opposed to one that failed while running.
    pub const fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::TypeError(_)
                | Self::MemberNotFound(_)
                | Self::MethodResolution(_)
                | Self::InvalidParameter(_)
                | Self::ConfigError(_)
        )
    }
}

/// Ensure a condition holds, returning an `ExecutionError` if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::RecastError::ExecutionError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::RecastError::$variant(format!($($msg)*)));
        }
    };
}
