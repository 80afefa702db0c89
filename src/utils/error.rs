use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Malformed card #{index} in group '{group}': {reason}")]
    MalformedCard {
        group: String,
        index: usize,
        reason: String,
    },

    #[error("Document error: {message}")]
    DocumentError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Submission failed (status {status}): {message}")]
    SubmissionError { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Document,
    Input,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PortfolioError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PortfolioError::ConfigError { .. }
            | PortfolioError::InvalidConfigValueError { .. }
            | PortfolioError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PortfolioError::MalformedCard { .. } | PortfolioError::DocumentError { .. } => {
                ErrorCategory::Document
            }
            PortfolioError::ValidationError { .. } => ErrorCategory::Input,
            PortfolioError::HttpError(_) | PortfolioError::SubmissionError { .. } => {
                ErrorCategory::Network
            }
            PortfolioError::IoError(_) | PortfolioError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單張卡片格式錯誤只會跳過該卡片
            PortfolioError::MalformedCard { .. } | PortfolioError::ValidationError { .. } => {
                ErrorSeverity::Low
            }
            PortfolioError::HttpError(_) | PortfolioError::SubmissionError { .. } => {
                ErrorSeverity::Medium
            }
            PortfolioError::ConfigError { .. }
            | PortfolioError::InvalidConfigValueError { .. }
            | PortfolioError::MissingConfigError { .. }
            | PortfolioError::DocumentError { .. } => ErrorSeverity::High,
            PortfolioError::IoError(_) | PortfolioError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PortfolioError::ValidationError { message } => message.clone(),
            PortfolioError::SubmissionError { .. } | PortfolioError::HttpError(_) => {
                "Failed to send message. Please try again later.".to_string()
            }
            PortfolioError::MalformedCard { group, index, .. } => {
                format!("Card #{} in '{}' could not be set up and was skipped", index, group)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the site configuration file and its defaults",
            ErrorCategory::Document => {
                "Make sure every card has a heading followed by at least one content element"
            }
            ErrorCategory::Input => "Correct the highlighted form fields and submit again",
            ErrorCategory::Network => "Check the e-mail service credentials and network access",
            ErrorCategory::System => "Verify the input files exist and contain valid JSON",
        }
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_card_is_low_severity() {
        let err = PortfolioError::MalformedCard {
            group: "projects".to_string(),
            index: 2,
            reason: "missing title".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Document);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.to_string().contains("projects"));
    }

    #[test]
    fn test_submission_error_message() {
        let err = PortfolioError::SubmissionError {
            status: 400,
            message: "bad template".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(
            err.user_friendly_message(),
            "Failed to send message. Please try again later."
        );
    }
}
