use rfp_sdk::types::{QuestionId, ReviewDecision, RfpId, VersionNumber};
use serde::Serialize;
use std::fmt;

use crate::session::SessionState;

/// Progress and failure notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    CategoriesLoaded {
        count: usize,
    },
    CategoryPredicted {
        category: String,
    },
    ResponseGenerated {
        category: String,
        precedents: usize,
    },
    SimilarityUnavailable {
        message: String,
    },
    ReviewSubmitted {
        question_id: Option<QuestionId>,
    },
    ReviewResolved {
        question_id: QuestionId,
        decision: ReviewDecision,
    },
    ReviewAlreadyResolved {
        question_id: QuestionId,
    },
    UploadStarted {
        name: String,
    },
    VersionCreated {
        rfp_id: RfpId,
        version: VersionNumber,
    },
    Downloaded {
        rfp_id: RfpId,
        bytes: usize,
    },
    StaleResultDiscarded {
        action: &'static str,
    },
    ActionFailed {
        action: &'static str,
        message: String,
    },
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateChanged { from, to } => write!(f, "Session {from} -> {to}"),
            Self::CategoriesLoaded { count } => write!(f, "Loaded {count} categories"),
            Self::CategoryPredicted { category } => write!(f, "Predicted category: {category}"),
            Self::ResponseGenerated {
                category,
                precedents,
            } => write!(
                f,
                "Generated response for {category} ({precedents} similar questions)"
            ),
            Self::SimilarityUnavailable { message } => {
                write!(f, "Similar questions unavailable: {message}")
            }
            Self::ReviewSubmitted { question_id } => match question_id {
                Some(id) => write!(f, "Sent for review as question {id}"),
                None => write!(f, "Sent for review"),
            },
            Self::ReviewResolved {
                question_id,
                decision,
            } => write!(f, "Question {question_id} marked {decision}"),
            Self::ReviewAlreadyResolved { question_id } => {
                write!(f, "Question {question_id} was already reviewed")
            }
            Self::UploadStarted { name } => write!(f, "Uploading {name}"),
            Self::VersionCreated { rfp_id, version } => {
                write!(f, "RFP {rfp_id} stored as version {version}")
            }
            Self::Downloaded { rfp_id, bytes } => write!(f, "Downloaded RFP {rfp_id} ({bytes} bytes)"),
            Self::StaleResultDiscarded { action } => {
                write!(f, "Discarded result of {action} from an abandoned session")
            }
            Self::ActionFailed { action, message } => write!(f, "{action} failed: {message}"),
        }
    }
}
