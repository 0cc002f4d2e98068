use thiserror::Error;

/// Errors returned by the Gemini API
#[derive(Debug, Error)]
pub enum GeminiApiError {
    #[error("Invalid request (400): {message}")]
    InvalidRequest { message: String },

    #[error("Authentication error (401): {message}")]
    Authentication { message: String },

    #[error("Permission error (403): {message}")]
    Permission { message: String },

    #[error("Not found (404): {message}")]
    NotFound { message: String },

    #[error("Rate limit exceeded (429): {message}")]
    RateLimit { message: String },

    #[error("Internal API error (500): {message}")]
    Api { message: String },

    #[error("Service unavailable (503): {message}")]
    Unavailable { message: String },

    /// Catch-all for unexpected status codes
    #[error("Unexpected API error ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl GeminiApiError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();

        match status {
            400 => Self::InvalidRequest { message },
            401 => Self::Authentication { message },
            403 => Self::Permission { message },
            404 => Self::NotFound { message },
            429 => Self::RateLimit { message },
            500 => Self::Api { message },
            503 => Self::Unavailable { message },
            other => Self::Unexpected {
                status: other,
                message,
            },
        }
    }
}
