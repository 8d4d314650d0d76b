//! Per-session state carried between the steps of answering one question.

use serde::Serialize;
use std::fmt;

use crate::error::{Result, WorkflowError};
use crate::generator::{GeneratedResponse, SimilarPrecedent};
use crate::review::ReviewReceipt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    CategorizingInFlight,
    CategorySelected,
    GeneratingInFlight,
    ResponseReady,
    EditingInProgress,
    ReviewSubmitted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::CategorizingInFlight => "categorizing",
            SessionState::CategorySelected => "category_selected",
            SessionState::GeneratingInFlight => "generating",
            SessionState::ResponseReady => "response_ready",
            SessionState::EditingInProgress => "editing",
            SessionState::ReviewSubmitted => "review_submitted",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionState::CategorizingInFlight | SessionState::GeneratingInFlight
        )
    }

    fn has_response(&self) -> bool {
        matches!(
            self,
            SessionState::ResponseReady | SessionState::EditingInProgress
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the later steps of a session need from the earlier ones
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionContext {
    pub query: String,
    pub category: Option<String>,
    pub category_description: Vec<String>,
    pub response: Option<GeneratedResponse>,
    pub edited_response: Option<String>,
    pub precedents: Vec<SimilarPrecedent>,
    /// Set when the precedent lookup failed for the last generation
    pub similarity_error: Option<String>,
    pub review_receipt: Option<ReviewReceipt>,
}

impl SessionContext {
    /// The edit if there is one, otherwise the generated text
    pub fn effective_response(&self) -> Option<&str> {
        self.edited_response
            .as_deref()
            .or_else(|| self.response.as_ref().map(|r| r.response_text.as_str()))
    }

    fn clear_generation(&mut self) {
        self.response = None;
        self.edited_response = None;
        self.precedents.clear();
        self.similarity_error = None;
    }
}

/// Work handed out when an in-flight action starts
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub epoch: u64,
    pub query: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub epoch: u64,
    pub question_text: String,
    pub original_response: String,
    pub edited_response: String,
}

/// Session state machine.
///
/// Every in-flight action captures the epoch it started in; `new_session`
/// bumps the epoch so results that arrive afterwards are dropped.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    context: SessionContext,
    epoch: u64,
    submitting: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Abandon the current session and start over
    pub fn reset(&mut self) -> u64 {
        self.epoch += 1;
        self.state = SessionState::Idle;
        self.context = SessionContext::default();
        self.submitting = false;
        self.epoch
    }

    fn reject(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            state: self.state,
            action,
        }
    }

    /// Replace the query text. A changed query invalidates any response
    /// generated for the previous one.
    pub fn set_query(&mut self, query: &str) -> Result<()> {
        if self.state.is_in_flight() || self.state == SessionState::ReviewSubmitted || self.submitting
        {
            return Err(self.reject("set query"));
        }
        if self.context.query == query {
            return Ok(());
        }
        self.context.query = query.to_string();
        if self.state.has_response() {
            self.context.clear_generation();
            self.state = SessionState::CategorySelected;
        }
        Ok(())
    }

    pub fn begin_categorize(&mut self) -> Result<(u64, String)> {
        if self.state.is_in_flight() || self.state == SessionState::ReviewSubmitted {
            return Err(self.reject("categorize"));
        }
        if self.context.query.trim().is_empty() {
            return Err(WorkflowError::validation("Enter a query before categorizing"));
        }
        self.state = SessionState::CategorizingInFlight;
        Ok((self.epoch, self.context.query.clone()))
    }

    /// Apply a prediction; returns false when the session moved on meanwhile
    pub fn finish_categorize(
        &mut self,
        epoch: u64,
        category: String,
        description: Vec<String>,
    ) -> bool {
        if !self.is_current(epoch) || self.state != SessionState::CategorizingInFlight {
            return false;
        }
        self.apply_category(category, description);
        true
    }

    pub fn select_category(&mut self, category: &str, description: Vec<String>) -> Result<()> {
        let allowed = match self.state {
            SessionState::Idle => !self.context.query.trim().is_empty(),
            SessionState::CategorySelected
            | SessionState::ResponseReady
            | SessionState::EditingInProgress => true,
            _ => false,
        };
        if !allowed || self.submitting {
            return Err(self.reject("select a category"));
        }
        if category.trim().is_empty() {
            return Err(WorkflowError::validation("Category cannot be empty"));
        }
        self.apply_category(category.trim().to_string(), description);
        Ok(())
    }

    fn apply_category(&mut self, category: String, description: Vec<String>) {
        self.context.clear_generation();
        self.context.category = Some(category);
        self.context.category_description = description;
        self.state = SessionState::CategorySelected;
    }

    pub fn begin_generate(&mut self) -> Result<PendingGeneration> {
        let allowed = self.state == SessionState::CategorySelected || self.state.has_response();
        if !allowed || self.submitting {
            return Err(self.reject("generate"));
        }
        let category = match self.context.category.clone() {
            Some(category) => category,
            None => return Err(self.reject("generate")),
        };
        if self.context.query.trim().is_empty() {
            return Err(WorkflowError::validation("Query cannot be empty"));
        }

        self.context.clear_generation();
        self.state = SessionState::GeneratingInFlight;
        Ok(PendingGeneration {
            epoch: self.epoch,
            query: self.context.query.clone(),
            category,
        })
    }

    /// Land the results of a generation; returns false for a stale epoch
    pub fn finish_generate(
        &mut self,
        epoch: u64,
        generated: Option<GeneratedResponse>,
        precedents: std::result::Result<Vec<SimilarPrecedent>, String>,
    ) -> bool {
        if !self.is_current(epoch) || self.state != SessionState::GeneratingInFlight {
            return false;
        }
        match generated {
            Some(response) => {
                self.context.response = Some(response);
                match precedents {
                    Ok(precedents) => self.context.precedents = precedents,
                    Err(message) => self.context.similarity_error = Some(message),
                }
                self.state = SessionState::ResponseReady;
            }
            None => self.state = SessionState::CategorySelected,
        }
        true
    }

    pub fn edit_response(&mut self, text: &str) -> Result<()> {
        if !self.state.has_response() || self.submitting {
            return Err(self.reject("edit the response"));
        }
        self.context.edited_response = Some(text.to_string());
        self.state = SessionState::EditingInProgress;
        Ok(())
    }

    pub fn begin_submit(&mut self) -> Result<PendingSubmission> {
        if !self.state.has_response() || self.submitting {
            return Err(self.reject("submit for review"));
        }
        let (question_text, original_response) = match self.context.response.as_ref() {
            Some(response) => (response.query_text.clone(), response.response_text.clone()),
            None => return Err(self.reject("submit for review")),
        };
        let edited_response = self
            .context
            .edited_response
            .clone()
            .unwrap_or_else(|| original_response.clone());

        self.submitting = true;
        Ok(PendingSubmission {
            epoch: self.epoch,
            question_text,
            original_response,
            edited_response,
        })
    }

    /// Complete a submission; `None` means it failed and editing may resume
    pub fn finish_submit(&mut self, epoch: u64, receipt: Option<ReviewReceipt>) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        self.submitting = false;
        if let Some(receipt) = receipt {
            self.context.review_receipt = Some(receipt);
            self.state = SessionState::ReviewSubmitted;
        }
        true
    }
}
