//! Human review gate for generated responses.
//!
//! Items are created unresolved at the portal and resolved exactly once.
//! The portal arbitrates concurrent resolution; this module keeps a local
//! working copy of the pending items and the decisions it has seen confirmed.

use chrono::{DateTime, Utc};
use rfp_sdk::client::PersistenceService;
use rfp_sdk::types::{
    parse_timestamp, QuestionId, ReviewDecision, ReviewRecord, ReviewStatusUpdate,
    ReviewSubmission, UserId,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::diff::{diff, DiffSpan};
use crate::error::{Result, WorkflowError};

pub const UNEDITED_PLACEHOLDER: &str = "No modified response provided";

/// Confirmed decisions remembered for idempotent retries; oldest evicted first
const CONFIRMED_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Unresolved,
    Accepted,
    Rejected,
}

impl ReviewStatus {
    /// Interpret the portal's status column; `None` for unknown values
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(|s| s.trim().to_ascii_lowercase()).unwrap_or_default();
        match raw.as_str() {
            "" | "pending" | "unresolved" | "null" => Some(Self::Unresolved),
            "accept" | "accepted" => Some(Self::Accepted),
            "reject" | "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl From<ReviewDecision> for ReviewStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Accept => Self::Accepted,
            ReviewDecision::Reject => Self::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    pub question_id: QuestionId,
    pub question_text: String,
    pub uploader: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub original_response: String,
    pub edited_response: Option<String>,
    pub status: ReviewStatus,
}

impl ReviewItem {
    fn from_record(record: ReviewRecord, status: ReviewStatus) -> Self {
        Self {
            question_id: record.question_id,
            question_text: record.question_text.unwrap_or_default(),
            uploader: record.user.and_then(|user| user.username),
            timestamp: record.timestamp.as_deref().and_then(parse_timestamp),
            original_response: record.response.unwrap_or_default(),
            edited_response: record.modified_response,
            status,
        }
    }
}

/// Response handed to reviewers
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub question_text: String,
    pub original_response: String,
    pub edited_response: String,
    pub submitted_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewReceipt {
    /// Present when the portal reports the id of the created item
    pub question_id: Option<QuestionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReviewDiff {
    Unedited,
    Edited(Vec<DiffSpan>),
}

impl ReviewDiff {
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            ReviewDiff::Unedited => Some(UNEDITED_PLACEHOLDER),
            ReviewDiff::Edited(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct ReviewState {
    pending: Vec<ReviewItem>,
    /// Decisions this instance saw confirmed by the portal
    confirmed: HashMap<QuestionId, ReviewDecision>,
    confirmed_order: VecDeque<QuestionId>,
    /// Idempotency keys of attempts whose outcome is not yet known
    attempts: HashMap<(QuestionId, ReviewDecision), Uuid>,
}

impl ReviewState {
    fn remember(&mut self, question_id: QuestionId, decision: ReviewDecision) {
        if self.confirmed.insert(question_id, decision).is_none() {
            self.confirmed_order.push_back(question_id);
        }
        while self.confirmed_order.len() > CONFIRMED_CAPACITY {
            if let Some(oldest) = self.confirmed_order.pop_front() {
                self.confirmed.remove(&oldest);
            }
        }
    }

    /// Drop decisions for records the portal no longer lists
    fn forget_missing(&mut self, listed: &HashSet<QuestionId>) {
        self.confirmed.retain(|id, _| listed.contains(id));
        self.confirmed_order.retain(|id| listed.contains(id));
    }
}

pub struct ReviewStateMachine {
    service: Arc<dyn PersistenceService>,
    state: Mutex<ReviewState>,
}

impl ReviewStateMachine {
    pub fn new(service: Arc<dyn PersistenceService>) -> Self {
        Self {
            service,
            state: Mutex::new(ReviewState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReviewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn submit_for_review(&self, request: ReviewRequest) -> Result<ReviewReceipt> {
        if request.question_text.trim().is_empty() {
            return Err(WorkflowError::validation("Question text cannot be empty"));
        }
        if request.edited_response.trim().is_empty() {
            return Err(WorkflowError::validation("Response cannot be empty"));
        }

        // An untouched response is stored without a modified copy
        let modified_response = if request.edited_response == request.original_response {
            None
        } else {
            Some(request.edited_response)
        };

        let ack = self
            .service
            .submit_review(ReviewSubmission {
                question_text: request.question_text,
                review_answer: request.original_response,
                modified_response,
                user_id: request.submitted_by,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "Review submission failed");
                WorkflowError::review_submit(e)
            })?;

        info!(question_id = ?ack.question_id, "Sent for review");
        Ok(ReviewReceipt {
            question_id: ack.question_id,
        })
    }

    /// Replace the local pending list with the portal's unresolved items
    pub async fn refresh_pending(&self) -> Result<Vec<ReviewItem>> {
        let records = self
            .service
            .list_reviews()
            .await
            .map_err(WorkflowError::unavailable)?;

        let listed: HashSet<QuestionId> = records.iter().map(|r| r.question_id).collect();
        let mut pending = Vec::new();
        for record in records {
            match ReviewStatus::parse(record.status.as_deref()) {
                Some(ReviewStatus::Unresolved) => {
                    pending.push(ReviewItem::from_record(record, ReviewStatus::Unresolved))
                }
                Some(_) => {}
                None => warn!(
                    question_id = record.question_id,
                    status = ?record.status,
                    "Dropping review record with unknown status"
                ),
            }
        }

        let mut state = self.lock();
        state.forget_missing(&listed);
        let confirmed = &state.confirmed;
        pending.retain(|item| !confirmed.contains_key(&item.question_id));
        debug!(count = pending.len(), "Refreshed pending reviews");
        state.pending = pending.clone();
        Ok(pending)
    }

    pub fn list_pending(&self) -> Vec<ReviewItem> {
        self.lock().pending.clone()
    }

    pub fn find_pending(&self, question_id: QuestionId) -> Option<ReviewItem> {
        self.lock()
            .pending
            .iter()
            .find(|item| item.question_id == question_id)
            .cloned()
    }

    /// Record a terminal decision for `question_id`.
    ///
    /// Repeating a confirmed decision is a no-op; a conflicting one, or a
    /// portal conflict, yields [`WorkflowError::AlreadyResolved`].
    pub async fn resolve(&self, question_id: QuestionId, decision: ReviewDecision) -> Result<()> {
        let idempotency_key = {
            let mut state = self.lock();
            match state.confirmed.get(&question_id) {
                Some(confirmed) if *confirmed == decision => {
                    debug!(question_id, %decision, "Decision already confirmed");
                    return Ok(());
                }
                Some(_) => return Err(WorkflowError::AlreadyResolved { question_id }),
                None => {}
            }
            *state
                .attempts
                .entry((question_id, decision))
                .or_insert_with(Uuid::new_v4)
        };

        let outcome = self
            .service
            .resolve_review(ReviewStatusUpdate {
                question_id,
                status: decision,
                idempotency_key,
            })
            .await;

        match outcome {
            Ok(_) => {
                let mut state = self.lock();
                state.attempts.remove(&(question_id, decision));
                state.remember(question_id, decision);
                state.pending.retain(|item| item.question_id != question_id);
                info!(question_id, %decision, "Review resolved");
                Ok(())
            }
            Err(e) if e.is_conflict() || e.is_not_found() => {
                self.lock().attempts.remove(&(question_id, decision));
                info!(question_id, error = %e, "Review was already resolved elsewhere");
                if let Err(refresh_err) = self.refresh_pending().await {
                    warn!(error = %refresh_err, "Failed to refresh pending reviews");
                }
                Err(WorkflowError::AlreadyResolved { question_id })
            }
            Err(e) => {
                warn!(question_id, error = %e, "Failed to resolve review");
                Err(WorkflowError::resolve(e))
            }
        }
    }

    pub fn render_diff(item: &ReviewItem) -> ReviewDiff {
        match &item.edited_response {
            None => ReviewDiff::Unedited,
            Some(edited) => ReviewDiff::Edited(diff(&item.original_response, edited)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffTag;

    fn item(edited: Option<&str>) -> ReviewItem {
        ReviewItem {
            question_id: 1,
            question_text: "vendor SLA terms".to_string(),
            uploader: Some("asha".to_string()),
            timestamp: None,
            original_response: "R".to_string(),
            edited_response: edited.map(str::to_string),
            status: ReviewStatus::Unresolved,
        }
    }

    #[test]
    fn test_confirmed_decisions_are_bounded() {
        let mut state = ReviewState::default();
        for id in 0..(CONFIRMED_CAPACITY as i64 + 5) {
            state.remember(id, ReviewDecision::Accept);
        }
        state.remember(7, ReviewDecision::Accept);

        assert_eq!(state.confirmed.len(), CONFIRMED_CAPACITY);
        assert_eq!(state.confirmed_order.len(), CONFIRMED_CAPACITY);
        assert!(!state.confirmed.contains_key(&0));
        assert!(!state.confirmed.contains_key(&4));
        assert!(state.confirmed.contains_key(&5));
    }

    #[test]
    fn test_forget_missing_keeps_listed() {
        let mut state = ReviewState::default();
        state.remember(1, ReviewDecision::Accept);
        state.remember(2, ReviewDecision::Reject);

        state.forget_missing(&HashSet::from([2]));

        assert_eq!(state.confirmed.len(), 1);
        assert_eq!(state.confirmed.get(&2), Some(&ReviewDecision::Reject));
        assert_eq!(state.confirmed_order, VecDeque::from([2]));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ReviewStatus::parse(None), Some(ReviewStatus::Unresolved));
        assert_eq!(ReviewStatus::parse(Some(" ")), Some(ReviewStatus::Unresolved));
        assert_eq!(ReviewStatus::parse(Some("Pending")), Some(ReviewStatus::Unresolved));
        assert_eq!(ReviewStatus::parse(Some("accept")), Some(ReviewStatus::Accepted));
        assert_eq!(ReviewStatus::parse(Some("REJECTED")), Some(ReviewStatus::Rejected));
        assert_eq!(ReviewStatus::parse(Some("escalated")), None);
    }

    #[test]
    fn test_render_diff_unedited() {
        let diff = ReviewStateMachine::render_diff(&item(None));
        assert_eq!(diff, ReviewDiff::Unedited);
        assert_eq!(diff.placeholder(), Some(UNEDITED_PLACEHOLDER));
    }

    #[test]
    fn test_render_diff_edited() {
        match ReviewStateMachine::render_diff(&item(Some("R'"))) {
            ReviewDiff::Edited(spans) => {
                assert_eq!(spans[0].tag, DiffTag::Removed);
                assert_eq!(spans[1].tag, DiffTag::Added);
                assert_eq!(spans[1].text, "R'");
            }
            other => panic!("unexpected diff: {other:?}"),
        }
    }
}
