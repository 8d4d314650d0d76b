use thiserror::Error;

/// Error types for calls against the portal and model services
#[derive(Error, Debug)]
pub enum SdkError {
    /// Authentication failed (HTTP 401/403)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Invalid request parameters (HTTP 400/413/422)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Resource does not exist (HTTP 404)
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The resource changed underneath the caller (HTTP 409)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// API error with status code (HTTP 4xx/5xx except above)
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Network or connection error
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// JSON parsing or serialization error
    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// Generic error for unexpected cases
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SdkError {
    /// Create an authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an API error
    pub fn api_error(status: u16, message: String) -> Self {
        Self::Api { status, message }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status code behind this error, when one was received.
    ///
    /// Transport and parse failures report `0`.
    pub fn status(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::InvalidRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Api { status, .. } => *status,
            Self::Network { source } => source.status().map(|s| s.as_u16()).unwrap_or(0),
            Self::Parse { .. } | Self::Internal { .. } => 0,
        }
    }

    /// Response body or description carried by this error
    pub fn body(&self) -> String {
        match self {
            Self::Authentication { message }
            | Self::InvalidRequest { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Api { message, .. }
            | Self::Internal { message } => message.clone(),
            Self::Network { source } => source.to_string(),
            Self::Parse { source } => source.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_classified_errors() {
        assert_eq!(SdkError::conflict("taken").status(), 409);
        assert_eq!(SdkError::not_found("gone").status(), 404);
        assert_eq!(SdkError::api_error(502, "bad gateway".into()).status(), 502);
        assert_eq!(SdkError::internal("oops").status(), 0);
    }

    #[test]
    fn test_body_keeps_message() {
        let err = SdkError::api_error(500, "model crashed".into());
        assert_eq!(err.body(), "model crashed");
        assert_eq!(err.to_string(), "API error (status 500): model crashed");
    }
}
