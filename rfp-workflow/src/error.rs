use rfp_sdk::{types::QuestionId, SdkError};
use thiserror::Error;

use crate::session::SessionState;

/// Errors surfaced by the workflow core
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Bad local input, rejected before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The session is not in a state that allows the action
    #[error("Cannot {action} while session is {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },

    /// The session was restarted while the action was in flight
    #[error("The session was restarted before {action} finished")]
    Superseded { action: &'static str },

    /// Another upload is still in flight
    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Generation failed (status {status}): {body}")]
    Generation { status: u16, body: String },

    #[error("Enrichment failed: {message}")]
    Enrichment { message: String },

    #[error("Upload failed: {message}")]
    Upload { message: String },

    #[error("Download failed: {message}")]
    Download { message: String },

    #[error("Review submission failed: {message}")]
    ReviewSubmit { message: String },

    #[error("Resolving review failed: {message}")]
    Resolve { message: String },

    /// Someone else resolved the item first
    #[error("Review item {question_id} is already resolved")]
    AlreadyResolved { question_id: QuestionId },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl WorkflowError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }

    pub fn generation(err: &SdkError) -> Self {
        Self::Generation {
            status: err.status(),
            body: err.body(),
        }
    }

    pub fn enrichment(err: impl std::fmt::Display) -> Self {
        Self::Enrichment {
            message: err.to_string(),
        }
    }

    pub fn upload(err: impl std::fmt::Display) -> Self {
        Self::Upload {
            message: err.to_string(),
        }
    }

    pub fn download(err: impl std::fmt::Display) -> Self {
        Self::Download {
            message: err.to_string(),
        }
    }

    pub fn review_submit(err: impl std::fmt::Display) -> Self {
        Self::ReviewSubmit {
            message: err.to_string(),
        }
    }

    pub fn resolve(err: impl std::fmt::Display) -> Self {
        Self::Resolve {
            message: err.to_string(),
        }
    }

    /// Rejected locally, no collaborator was contacted
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidTransition { .. } | Self::UploadInProgress
        )
    }

    /// Outcomes that are part of normal operation rather than faults
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::AlreadyResolved { .. } | Self::Superseded { .. })
    }

    /// Text shown to the person who triggered the action
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::InvalidTransition { .. } | Self::Superseded { .. } => self.to_string(),
            Self::UploadInProgress => {
                "An upload is already running. Wait for it to finish.".to_string()
            }
            Self::Unavailable { .. } => {
                "The service is unavailable. Please try again.".to_string()
            }
            Self::Generation { .. } => {
                "Failed to generate response. Please try again.".to_string()
            }
            Self::Enrichment { .. } => "Error occurred while enriching response".to_string(),
            Self::Upload { message } => format!("Error processing RFP: {message}"),
            Self::Download { .. } => "Error downloading the file".to_string(),
            Self::ReviewSubmit { .. } => "Failed to send review. Please try again.".to_string(),
            Self::Resolve { .. } => "Failed to update the status!".to_string(),
            Self::AlreadyResolved { .. } => {
                "This item was already reviewed. The list has been refreshed.".to_string()
            }
            Self::Config(err) => format!("Configuration error: {err}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_keeps_status_and_body() {
        let sdk = SdkError::api_error(502, "upstream down".to_string());
        match WorkflowError::generation(&sdk) {
            WorkflowError::Generation { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_classification() {
        assert!(WorkflowError::validation("empty").is_local());
        assert!(WorkflowError::UploadInProgress.is_local());
        assert!(!WorkflowError::download("x").is_local());
        assert!(WorkflowError::AlreadyResolved { question_id: 1 }.is_expected());
        assert!(!WorkflowError::resolve("x").is_expected());
    }

    #[test]
    fn test_transition_message() {
        let err = WorkflowError::InvalidTransition {
            state: SessionState::Idle,
            action: "generate",
        };
        assert_eq!(err.to_string(), "Cannot generate while session is idle");
    }
}
