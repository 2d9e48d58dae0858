use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Fetch failed for {url} after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parse,
    Config,
    Io,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::HttpError(_) | ScoutError::FetchExhausted { .. } => ErrorCategory::Network,
            ScoutError::SerializationError(_) => ErrorCategory::Parse,
            ScoutError::ConfigError { .. } | ScoutError::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
            ScoutError::IoError(_) | ScoutError::CsvError(_) => ErrorCategory::Io,
            ScoutError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤在 listing 層級以 fail-open 處理
            ScoutError::HttpError(_) | ScoutError::FetchExhausted { .. } => ErrorSeverity::Medium,
            ScoutError::SerializationError(_) => ErrorSeverity::Low,
            ScoutError::ConfigError { .. } | ScoutError::InvalidConfigValueError { .. } => {
                ErrorSeverity::High
            }
            ScoutError::IoError(_) | ScoutError::CsvError(_) => ErrorSeverity::High,
            ScoutError::ProcessingError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScoutError::HttpError(_) => {
                "Check network connectivity and that the marketplace is reachable".to_string()
            }
            ScoutError::FetchExhausted { url, .. } => {
                format!("The page at {} could not be fetched; retry later", url)
            }
            ScoutError::CsvError(_) => {
                "Check that the output directory is writable and the CSV is not open elsewhere"
                    .to_string()
            }
            ScoutError::IoError(_) => "Check file permissions and available disk space".to_string(),
            ScoutError::SerializationError(_) => {
                "The page carried malformed structured data; this is usually transient".to_string()
            }
            ScoutError::ConfigError { .. } | ScoutError::InvalidConfigValueError { .. } => {
                "Review the CLI flags / TOML config file and fix the reported field".to_string()
            }
            ScoutError::ProcessingError { .. } => {
                "This is likely a bug; re-run with --verbose and report the log".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Parse => format!("Page could not be parsed: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Io => format!("File problem: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = ScoutError::FetchExhausted {
            url: "https://example.com/x".to_string(),
            attempts: 3,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = ScoutError::InvalidConfigValueError {
            field: "max_pages".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_messages_are_nonempty() {
        let err = ScoutError::ConfigError {
            message: "bad toml".to_string(),
        };
        assert!(!err.recovery_suggestion().is_empty());
        assert!(err.user_friendly_message().contains("Configuration"));
    }
}
