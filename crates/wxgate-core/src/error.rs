//! Error types shared across the wxgate crates.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    /// Short operator-facing hint for startup failures.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file not found. Check WXGATE_CONFIG.",
            ConfigError::Read { .. } => "Configuration file could not be read. Check its permissions.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = ConfigError::NotFound("/etc/wxgate.toml".into());
        assert!(err.to_string().contains("/etc/wxgate.toml"));
    }

    #[test]
    fn test_read_error_keeps_io_source() {
        use std::error::Error as _;

        let err = ConfigError::Read {
            path: "/etc/wxgate.toml".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/etc/wxgate.toml"));
        assert!(err.source().is_some());
        assert!(err.user_message().contains("permissions"));
    }

    #[test]
    fn test_user_message() {
        assert!(ConfigError::NotFound("x".into())
            .user_message()
            .contains("WXGATE_CONFIG"));
        assert!(ConfigError::ParseError("x".into())
            .user_message()
            .contains("malformed"));
    }
}
