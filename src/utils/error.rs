use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP request returned status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Path too long: {len} bytes exceeds limit of {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("Host lookup failed for '{host}'")]
    HostLookup { host: String },

    #[error("List error: {0}")]
    List(#[from] crate::core::list::ListError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Network,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExtError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) | Self::NameTooLong { .. } => ErrorCategory::Io,
            Self::HttpError(_) | Self::HttpStatus { .. } | Self::HostLookup { .. } => {
                ErrorCategory::Network
            }
            Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::UrlError(_)
            | Self::JsonError(_)
            | Self::InvalidArgument { .. }
            | Self::List(_) => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// Maps the error onto an errno value, where one applies.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::IoError(e) => e.raw_os_error(),
            Self::InvalidArgument { .. } | Self::UrlError(_) => Some(22), // EINVAL
            Self::NameTooLong { .. } => Some(36),                         // ENAMETOOLONG
            Self::List(e) => Some(e.errno()),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the path exists and is accessible",
            ErrorCategory::Network => "Check network connectivity and the remote address",
            ErrorCategory::Configuration => "Review the configuration file and CLI arguments",
            ErrorCategory::Input => "Check the arguments passed to the command",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("File operation failed: {}", e),
            Self::HttpStatus { url, status } => {
                format!("Download of {} failed with HTTP {}", url, status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = ExtError::invalid_argument("size must be non-zero");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.errno(), Some(22));

        let err = ExtError::HostLookup {
            host: "nowhere.invalid".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_io_errno_passthrough() {
        let err = ExtError::from(std::io::Error::from_raw_os_error(2));
        assert_eq!(err.errno(), Some(2));
        assert!(err.user_friendly_message().starts_with("File operation failed"));
    }
}
