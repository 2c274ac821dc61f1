//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid site.toml")]
    Toml(#[from] toml::de::Error),

    #[error("source directory does not exist: `{0}`")]
    SourceMissing(PathBuf),

    #[error("[build.{field}] {message}")]
    Validation { field: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("site.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io_err.to_string(), "cannot read config `site.toml`");

        let missing = ConfigError::SourceMissing(PathBuf::from("/nowhere"));
        assert!(missing.to_string().contains("/nowhere"));

        let validation = ConfigError::Validation {
            field: "output",
            message: "must differ from source".into(),
        };
        assert_eq!(validation.to_string(), "[build.output] must differ from source");
    }
}
