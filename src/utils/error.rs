use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelpDeskError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Dataset error ({path}): {message}")]
    DatasetError { path: String, message: String },

    #[error("Generation failed: {message}")]
    GenerationError { message: String },

    #[error("Unknown staff member: {name}")]
    UnknownStaffError { name: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HelpDeskError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HelpDeskError::ApiError(_) | HelpDeskError::GenerationError { .. } => {
                ErrorCategory::Network
            }
            HelpDeskError::CsvError(_)
            | HelpDeskError::SerializationError(_)
            | HelpDeskError::DatasetError { .. } => ErrorCategory::Data,
            HelpDeskError::ConfigError { .. }
            | HelpDeskError::ConfigValidationError { .. }
            | HelpDeskError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            HelpDeskError::UnknownStaffError { .. } | HelpDeskError::ValidationError { .. } => {
                ErrorCategory::Input
            }
            HelpDeskError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HelpDeskError::ApiError(_) | HelpDeskError::GenerationError { .. } => {
                "Check that the language model endpoint is reachable, or start with --no-llm"
            }
            HelpDeskError::CsvError(_) | HelpDeskError::DatasetError { .. } => {
                "Check that every dataset file exists and has two columns: question,answer"
            }
            HelpDeskError::SerializationError(_) => "Check the JSON payload format",
            HelpDeskError::ConfigError { .. }
            | HelpDeskError::ConfigValidationError { .. }
            | HelpDeskError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line arguments and try again"
            }
            HelpDeskError::UnknownStaffError { .. } => "Use GET /staff to list staff members",
            HelpDeskError::ValidationError { .. } => "Correct the input and try again",
            HelpDeskError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HelpDeskError::ApiError(_) | HelpDeskError::GenerationError { .. } => {
                "The language model could not be reached".to_string()
            }
            HelpDeskError::DatasetError { path, .. } => {
                format!("The FAQ dataset '{}' could not be read", path)
            }
            HelpDeskError::CsvError(_) => "The FAQ dataset is malformed".to_string(),
            HelpDeskError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HelpDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = HelpDeskError::ValidationError {
            message: "empty".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Low);

        let err = HelpDeskError::DatasetError {
            path: "faq.csv".to_string(),
            message: "missing".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("faq.csv"));
    }
}
