//! Error types for Guildsmith Core
//!
//! Provides the error taxonomy shared by every engine component:
//! - Platform rejections (permission, rate limit, missing resource)
//! - Input validation failures
//! - Configuration loading failures

use std::path::PathBuf;

/// Remote platform rejected an operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// Missing privilege for the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Rate limit hit
    #[error("rate limited (retry after {retry_after_ms}ms)")]
    RateLimited { retry_after_ms: u64 },

    /// Target resource no longer exists
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other rejection
    #[error("rejected: {0}")]
    Rejected(String),
}

impl PlatformError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Short machine-readable kind, used as a log field
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "forbidden",
            Self::RateLimited { .. } => "rate_limited",
            Self::NotFound(_) => "not_found",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Operator input failed validation; nothing was mutated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Theme key not present in the template registry
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse into the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_error_display() {
        let err = PlatformError::Forbidden("create role".to_string());
        assert!(err.to_string().contains("forbidden"));
    }

    #[test]
    fn platform_error_is_retryable() {
        assert!(PlatformError::RateLimited { retry_after_ms: 500 }.is_retryable());
        assert!(!PlatformError::NotFound("x".to_string()).is_retryable());
    }

    #[test]
    fn validation_error_names_theme() {
        let err = ValidationError::UnknownTheme("jazz".to_string());
        assert_eq!(err.to_string(), "unknown theme: jazz");
    }
}
