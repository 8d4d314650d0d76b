use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of a logical RFP document
pub type RfpId = i64;

/// Identifier of a review record
pub type QuestionId = i64;

/// Identifier of a portal user
pub type UserId = i64;

/// Category row returned by the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(rename = "categoryName")]
    pub category_name: String,
}

/// Body shared by every call that only carries a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Reply of the category predictor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictCategoryResponse {
    #[serde(default)]
    pub predicted_class: Option<serde_json::Value>,
}

impl PredictCategoryResponse {
    /// The predicted label, if the service produced a usable one
    pub fn label(&self) -> Option<&str> {
        self.predicted_class
            .as_ref()
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// Request for a single generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// A previously answered question ranked by similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarQuestion {
    pub question: String,
    pub answer: String,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarQuestionsResponse {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub similar_questions: Vec<SimilarQuestion>,
}

/// Request to polish an existing answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichRequest {
    pub query: String,
    pub label: String,
    pub response_to_enrich: String,
}

/// The enrichment endpoint answers 200 with either field set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichResponse {
    #[serde(default)]
    pub enriched_response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Multipart payload for `/upload_rfp/`
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub rfp_name: String,
    pub uploaded_by: String,
    pub user_id: UserId,
    pub file_name: String,
    pub content: Vec<u8>,
    /// Set when re-submitting an existing document so the service appends a version
    pub rfp_id: Option<RfpId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download_path: Option<String>,
    #[serde(default)]
    pub rfpid: Option<RfpId>,
    #[serde(default)]
    pub version: Option<VersionNumber>,
}

/// Version label assigned by the persistence service.
///
/// The service sends versions either as JSON numbers or as decimal strings
/// (`"2.0"`). The label is kept verbatim and ordered numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionNumber(String);

impl VersionNumber {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn numeric(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok()
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a
                .partial_cmp(&b)
                .map(|ordering| ordering.then_with(|| self.0.cmp(&other.0))),
            _ => Some(self.0.cmp(&other.0)),
        }
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawVersion {
            Text(String),
            Number(f64),
        }

        Ok(match RawVersion::deserialize(deserializer)? {
            RawVersion::Text(text) => VersionNumber(text),
            RawVersion::Number(n) if n.fract() == 0.0 => VersionNumber(format!("{n:.1}")),
            RawVersion::Number(n) => VersionNumber(n.to_string()),
        })
    }
}

/// Row of the document search listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RfpRecord {
    #[serde(default)]
    pub rfpid: Option<RfpId>,
    #[serde(default)]
    pub rfpname: Option<String>,
    #[serde(default, rename = "lastUpdated")]
    pub last_updated: Option<String>,
    #[serde(default, rename = "uploadedBy")]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub version: Option<VersionNumber>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    #[serde(rename = "addedByuserId")]
    pub added_by_user_id: UserId,
    #[serde(rename = "addeduserId")]
    pub added_user_id: UserId,
    #[serde(rename = "RFPId")]
    pub rfp_id: RfpId,
}

/// A response handed to reviewers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmission {
    #[serde(rename = "questionText")]
    pub question_text: String,
    #[serde(rename = "ReviewAnswer")]
    pub review_answer: String,
    #[serde(rename = "modifiedResponse")]
    pub modified_response: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// Acknowledgement of a review submission.
///
/// Older portal builds answer with plain text; that text lands in `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewAck {
    #[serde(default, rename = "questionId")]
    pub question_id: Option<QuestionId>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUser {
    #[serde(default)]
    pub username: Option<String>,
}

/// Review row as stored by the portal. `status` is null while unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "questionId")]
    pub question_id: QuestionId,
    /// Listed as `query`; `questionText` is only the submission field name
    #[serde(default, rename = "query", alias = "questionText")]
    pub question_text: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, rename = "modifiedResponse")]
    pub modified_response: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user: Option<ReviewUser>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Terminal reviewer decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDecision::Accept => write!(f, "accept"),
            ReviewDecision::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStatusUpdate {
    #[serde(rename = "questionId")]
    pub question_id: QuestionId,
    pub status: ReviewDecision,
    #[serde(rename = "idempotencyKey")]
    pub idempotency_key: uuid::Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// Parse the timestamp formats the portal emits (RFC 3339, or a naive ISO
/// datetime interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_string_and_number() {
        let from_text: VersionNumber = serde_json::from_str(r#""2.0""#).unwrap();
        let from_int: VersionNumber = serde_json::from_str("3").unwrap();
        let from_float: VersionNumber = serde_json::from_str("1.5").unwrap();

        assert_eq!(from_text.as_str(), "2.0");
        assert_eq!(from_int.as_str(), "3.0");
        assert_eq!(from_float.as_str(), "1.5");
        assert!(from_float < from_text);
        assert!(from_text < from_int);
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        assert!(VersionNumber::new("10.0") > VersionNumber::new("9.0"));
        assert_eq!(
            VersionNumber::new("1.0").partial_cmp(&VersionNumber::new("1.0")),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_predicted_label_filters_unusable_values() {
        let parse = |body: &str| serde_json::from_str::<PredictCategoryResponse>(body).unwrap();

        assert_eq!(parse(r#"{"predicted_class": "Compliance"}"#).label(), Some("Compliance"));
        assert_eq!(parse(r#"{"predicted_class": "  "}"#).label(), None);
        assert_eq!(parse(r#"{"predicted_class": null}"#).label(), None);
        assert_eq!(parse(r#"{"predicted_class": 4}"#).label(), None);
        assert_eq!(parse("{}").label(), None);
    }

    #[test]
    fn test_review_record_with_null_status() {
        let record: ReviewRecord = serde_json::from_str(
            r#"{
                "questionId": 7,
                "questionText": "vendor SLA terms",
                "response": "R",
                "modifiedResponse": null,
                "timestamp": "2024-05-01T10:00:00",
                "user": {"username": "asha"},
                "status": null
            }"#,
        )
        .unwrap();

        assert_eq!(record.question_id, 7);
        assert_eq!(record.question_text.as_deref(), Some("vendor SLA terms"));
        assert!(record.status.is_none());
        assert!(record.modified_response.is_none());
        assert_eq!(record.user.unwrap().username.as_deref(), Some("asha"));
    }

    #[test]
    fn test_review_record_reads_portal_query_field() {
        let record: ReviewRecord = serde_json::from_str(
            r#"{
                "questionId": 1,
                "query": "vendor SLA terms",
                "response": "R",
                "modifiedResponse": "R'",
                "timestamp": "2024-05-01T10:00:00",
                "user": {"username": "asha"},
                "status": null
            }"#,
        )
        .unwrap();

        assert_eq!(record.question_text.as_deref(), Some("vendor SLA terms"));
        assert_eq!(record.modified_response.as_deref(), Some("R'"));
    }

    #[test]
    fn test_status_update_wire_shape() {
        let update = ReviewStatusUpdate {
            question_id: 3,
            status: ReviewDecision::Reject,
            idempotency_key: uuid::Uuid::nil(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["questionId"], 3);
        assert_eq!(json["status"], "reject");
        assert_eq!(json["idempotencyKey"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
