use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageGenError {
    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Request failed: Timeout after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {reason}\nRaw: {raw}")]
    ResponseError { reason: String, raw: String },

    #[error("Failed to decode image data: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Failed to write image file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("{message}")]
    ManifestError { message: String },

    #[error("{message}")]
    UsageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Response,
    Storage,
    Input,
    Configuration,
}

impl ImageGenError {
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::ManifestError {
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::UsageError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RequestError(_) | Self::TimeoutError { .. } => ErrorCategory::Network,
            Self::ApiError { .. } => ErrorCategory::Api,
            Self::ResponseError { .. } | Self::DecodeError(_) => ErrorCategory::Response,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::ManifestError { .. } | Self::UsageError { .. } => ErrorCategory::Input,
            Self::TomlError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// 是否為 HTTP 429
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::ApiError { status: 429, .. })
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError { status: 401 | 403, .. } => {
                "Check the bearer token passed via --api-key or WHOMEAI_API_KEY"
            }
            Self::ApiError { status: 429, .. } => {
                "The API is still rate limiting; wait a while or raise --delay for batches"
            }
            Self::ApiError { .. } => "Check the model and size values accepted by the API",
            Self::RequestError(_) | Self::TimeoutError { .. } => {
                "Check network connectivity and --api-url, or raise --timeout"
            }
            Self::ResponseError { .. } | Self::DecodeError(_) => {
                "The API returned an unexpected payload; retry or check the endpoint"
            }
            Self::IoError(_) => "Check that the output location exists and is writable",
            Self::ManifestError { .. } => {
                "The prompts file must be a JSON array of objects with non-empty name and prompt"
            }
            Self::UsageError { .. } => "Run with --help to see the accepted arguments",
            Self::TomlError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the flag or config file value and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, ImageGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ImageGenError::ApiError {
            status: 500,
            message: r#"{"error":"boom"}"#.into(),
        };
        assert_eq!(err.to_string(), r#"API error (500): {"error":"boom"}"#);
        assert_eq!(err.category(), ErrorCategory::Api);
    }

    #[test]
    fn test_rate_limited_detection() {
        let limited = ImageGenError::ApiError {
            status: 429,
            message: "slow down".into(),
        };
        assert!(limited.is_rate_limited());
        assert!(!ImageGenError::manifest("bad").is_rate_limited());
    }

    #[test]
    fn test_manifest_error_is_verbatim() {
        let err = ImageGenError::manifest("Missing name or prompt at index 2");
        assert_eq!(err.to_string(), "Missing name or prompt at index 2");
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_timeout_display() {
        let err = ImageGenError::TimeoutError { seconds: 120 };
        assert_eq!(err.to_string(), "Request failed: Timeout after 120 seconds");
        assert_eq!(err.category(), ErrorCategory::Network);
    }
}
