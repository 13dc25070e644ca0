use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdlcError {
    #[error("Generator request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Generator returned an unusable reply: {message}")]
    GeneratorError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SdlcError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SdlcError::ApiError(_) | SdlcError::GeneratorError { .. } => ErrorCategory::Network,
            SdlcError::ConfigError { .. }
            | SdlcError::MissingConfigError { .. }
            | SdlcError::InvalidConfigValueError { .. }
            | SdlcError::TomlError(_)
            | SdlcError::ValidationError { .. } => ErrorCategory::Configuration,
            SdlcError::SerializationError(_) | SdlcError::CsvError(_) => ErrorCategory::Processing,
            SdlcError::IoError(_) | SdlcError::ZipError(_) | SdlcError::StorageError { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // Generator calls are retryable
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SdlcError::ApiError(_) | SdlcError::GeneratorError { .. } => {
                "Check network connectivity and the generator endpoint, then retry".to_string()
            }
            SdlcError::ConfigError { .. } | SdlcError::MissingConfigError { .. } => {
                "Set SDLC_API_KEY / SDLC_API_ENDPOINT or pass --config with a valid file"
                    .to_string()
            }
            SdlcError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and run again", field)
            }
            SdlcError::TomlError(_) => "Fix the syntax of the config file".to_string(),
            SdlcError::ValidationError { .. } => {
                "Adjust the project details and run again".to_string()
            }
            SdlcError::IoError(_) | SdlcError::ZipError(_) | SdlcError::StorageError { .. } => {
                "Check that the output directory exists and is writable".to_string()
            }
            SdlcError::SerializationError(_) | SdlcError::CsvError(_) => {
                "Re-run the generation; report the issue if it persists".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("The generator call failed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Processing => format!("Could not process the result: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SdlcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_errors_are_retryable() {
        let err = SdlcError::GeneratorError {
            message: "missing generated_text".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("retry"));
    }

    #[test]
    fn config_errors_are_blocking() {
        let err = SdlcError::MissingConfigError {
            field: "api_key".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
