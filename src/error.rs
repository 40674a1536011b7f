//! Error types for image transform and relay operations

use thiserror::Error;

/// Result type alias for picforge operations
pub type Result<T> = std::result::Result<T, PicforgeError>;

/// Comprehensive error types for transform and relay operations
#[derive(Error, Debug)]
pub enum PicforgeError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode or encode errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid or missing user input (no image, unsupported type, bad parameters)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The relay credential is not configured in the server environment
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// The upstream removal service rejected the request
    #[error("Upstream error (status {status}): {message}")]
    Upstream {
        /// HTTP status returned by the upstream service
        status: u16,
        /// Upstream error body, passed through verbatim
        message: String,
    },

    /// Transport-level failure talking to the upstream service
    #[error("Network error: {0}")]
    Network(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PicforgeError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new missing credential error
    pub fn missing_credential<S: Into<String>>(msg: S) -> Self {
        Self::MissingCredential(msg.into())
    }

    /// Create a new upstream error from a status code and response body
    pub fn upstream<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create network error with operation context
    pub fn network_error(operation: &str, error: reqwest::Error) -> Self {
        Self::Network(format!("Failed to {operation}: {error}"))
    }

    /// Create image decode error with size context
    pub fn decode_error(byte_len: usize, error: &image::ImageError) -> Self {
        Self::InvalidInput(format!(
            "Failed to decode image ({byte_len} bytes): {error}. Supported formats: PNG, JPEG, WebP"
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {parameter}: {value} (valid range: {valid_range})"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PicforgeError::invalid_input("no image in request");
        assert!(matches!(err, PicforgeError::InvalidInput(_)));

        let err = PicforgeError::missing_credential("REMOVE_BG_API_KEY not set");
        assert!(matches!(err, PicforgeError::MissingCredential(_)));
    }

    #[test]
    fn test_error_display() {
        let err = PicforgeError::invalid_config("width must be non-zero");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: width must be non-zero"
        );

        let err = PicforgeError::upstream(402, "quota exceeded");
        assert_eq!(err.to_string(), "Upstream error (status 402): quota exceeded");
    }

    #[test]
    fn test_config_value_error_context() {
        let err = PicforgeError::config_value_error("quality", 1.5, "0.1-1.0");
        let error_string = err.to_string();
        assert!(error_string.contains("quality"));
        assert!(error_string.contains("1.5"));
        assert!(error_string.contains("0.1-1.0"));
    }
}
