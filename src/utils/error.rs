use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API responded with status {status}: {body}")]
    HttpStatusError { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unexpected API response: {message}")]
    UnexpectedResponseError { message: String },

    #[error("Unable to find “{field}” in response.")]
    MissingResponseFieldError { field: String },

    #[error("API error: “{response}”")]
    RejectedError { response: String },

    #[error("Payload delivery was cancelled before sending")]
    PayloadCancelled,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

/// 錯誤分類，對應傳輸、語意與設定三種失敗
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Semantic,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IntegrationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IntegrationError::ApiError(_)
            | IntegrationError::HttpStatusError { .. }
            | IntegrationError::PayloadCancelled => ErrorCategory::Transport,
            IntegrationError::SerializationError(_)
            | IntegrationError::UnexpectedResponseError { .. }
            | IntegrationError::MissingResponseFieldError { .. }
            | IntegrationError::RejectedError { .. } => ErrorCategory::Semantic,
            IntegrationError::UrlError(_)
            | IntegrationError::ConfigError { .. }
            | IntegrationError::MissingConfigError { .. }
            | IntegrationError::InvalidConfigValueError { .. }
            | IntegrationError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            IntegrationError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            IntegrationError::PayloadCancelled => ErrorSeverity::Low,
            IntegrationError::ApiError(_) | IntegrationError::HttpStatusError { .. } => {
                ErrorSeverity::Medium
            }
            IntegrationError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 回應沒有取得時為 true（網路錯誤或非 2xx 狀態）
    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transport => {
                "Check network connectivity and that the API key is valid, then try again"
            }
            ErrorCategory::Semantic => {
                "Check the list id and field mapping against the lists returned by the provider"
            }
            ErrorCategory::Configuration => {
                "Review the configuration file and the MOOSEND_API_KEY environment variable"
            }
            ErrorCategory::System => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Transport => format!("Could not reach Moosend: {}", self),
            ErrorCategory::Semantic => format!("Moosend returned an unexpected result: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, IntegrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let status = IntegrationError::HttpStatusError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(status.category(), ErrorCategory::Transport);
        assert!(status.is_transport());

        let missing = IntegrationError::MissingResponseFieldError {
            field: "{instance_id}".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Semantic);
        assert!(!missing.is_transport());

        let config = IntegrationError::MissingConfigError {
            field: "api_key".to_string(),
        };
        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert_eq!(config.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_error_messages() {
        let missing = IntegrationError::MissingResponseFieldError {
            field: "{instance_id}".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Unable to find “{instance_id}” in response."
        );

        let rejected = IntegrationError::RejectedError {
            response: r#"{"Context":{"ID":""}}"#.to_string(),
        };
        assert_eq!(rejected.to_string(), r#"API error: “{"Context":{"ID":""}}”"#);
        assert!(rejected
            .user_friendly_message()
            .starts_with("Moosend returned an unexpected result"));
    }
}
