#![allow(dead_code)]

use rfp_sdk::client::{CategorizationService, GenerationService, PersistenceService};
use rfp_sdk::error::SdkError;
use rfp_sdk::types::{
    AssignmentRequest, CategoryRecord, DocumentUpload, EnrichRequest, EnrichResponse,
    GenerateRequest, GenerateResponse, PredictCategoryResponse, QuestionId, ReviewAck,
    ReviewRecord, ReviewStatusUpdate, ReviewSubmission, ReviewUser, RfpId, RfpRecord,
    SimilarQuestion, SimilarQuestionsResponse, StatusAck, UploadResponse, UserId, UserRecord,
    VersionNumber,
};
use rfp_workflow::config::UserConfig;
use rfp_workflow::{Taxonomy, Workflow};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const QUERY_CSV: &[u8] = b"id,query\n1,What is your uptime SLA?\n2,Do you support SSO?\n";

pub fn test_user() -> UserConfig {
    UserConfig {
        user_id: 1,
        user_name: "asha".to_string(),
    }
}

pub struct MockCategorizer {
    pub categories: Vec<String>,
    pub prediction: Mutex<Result<Value, u16>>,
    pub predict_calls: Arc<Mutex<usize>>,
}

impl MockCategorizer {
    pub fn new(categories: &[&str]) -> Self {
        Self {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            prediction: Mutex::new(Ok(Value::Null)),
            predict_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn predicting(self, label: Value) -> Self {
        *self.prediction.lock().unwrap() = Ok(label);
        self
    }

    pub fn failing_prediction(self, status: u16) -> Self {
        *self.prediction.lock().unwrap() = Err(status);
        self
    }

    pub fn get_predict_calls(&self) -> usize {
        *self.predict_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl CategorizationService for MockCategorizer {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, SdkError> {
        Ok(self
            .categories
            .iter()
            .map(|name| CategoryRecord {
                category_name: name.clone(),
            })
            .collect())
    }

    async fn predict_category(&self, _query: &str) -> Result<PredictCategoryResponse, SdkError> {
        *self.predict_calls.lock().unwrap() += 1;
        match &*self.prediction.lock().unwrap() {
            Ok(label) => Ok(PredictCategoryResponse {
                predicted_class: Some(label.clone()),
            }),
            Err(status) => Err(SdkError::api_error(*status, "classifier down".to_string())),
        }
    }
}

pub struct MockGenerator {
    pub response_text: Mutex<String>,
    pub generate_failure: Mutex<Option<u16>>,
    pub generate_delay: Mutex<Option<Duration>>,
    pub similar: Vec<SimilarQuestion>,
    pub similar_failure: Mutex<bool>,
    pub enrich_reply: Mutex<EnrichResponse>,
    pub generate_calls: Arc<Mutex<usize>>,
    pub similar_calls: Arc<Mutex<usize>>,
}

impl MockGenerator {
    pub fn new(response_text: &str) -> Self {
        Self {
            response_text: Mutex::new(response_text.to_string()),
            generate_failure: Mutex::new(None),
            generate_delay: Mutex::new(None),
            similar: vec![
                SimilarQuestion {
                    question: "What uptime do you guarantee?".to_string(),
                    answer: "99.9% monthly".to_string(),
                    similarity_score: 0.91,
                },
                SimilarQuestion {
                    question: "Describe your support hours".to_string(),
                    answer: "24x7".to_string(),
                    similarity_score: 0.47,
                },
            ],
            similar_failure: Mutex::new(false),
            enrich_reply: Mutex::new(EnrichResponse::default()),
            generate_calls: Arc::new(Mutex::new(0)),
            similar_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_generate_calls(&self) -> usize {
        *self.generate_calls.lock().unwrap()
    }

    pub fn get_similar_calls(&self) -> usize {
        *self.similar_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl GenerationService for MockGenerator {
    async fn generate_response(
        &self,
        _request: GenerateRequest,
    ) -> Result<GenerateResponse, SdkError> {
        *self.generate_calls.lock().unwrap() += 1;
        let delay = *self.generate_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = *self.generate_failure.lock().unwrap() {
            return Err(SdkError::api_error(status, "model overloaded".to_string()));
        }
        Ok(GenerateResponse {
            response: self.response_text.lock().unwrap().clone(),
        })
    }

    async fn fetch_similar(&self, query: &str) -> Result<SimilarQuestionsResponse, SdkError> {
        *self.similar_calls.lock().unwrap() += 1;
        if *self.similar_failure.lock().unwrap() {
            return Err(SdkError::api_error(503, "index rebuilding".to_string()));
        }
        Ok(SimilarQuestionsResponse {
            query: Some(query.to_string()),
            similar_questions: self.similar.clone(),
        })
    }

    async fn enrich_response(&self, _request: EnrichRequest) -> Result<EnrichResponse, SdkError> {
        Ok(self.enrich_reply.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub name: String,
    pub source: Vec<u8>,
    pub versions: Vec<(VersionNumber, Vec<u8>)>,
}

/// In-memory portal. Review resolution is compare-and-set like the real one.
pub struct InMemoryPortal {
    pub documents: Mutex<HashMap<RfpId, StoredDocument>>,
    pub reviews: Mutex<Vec<ReviewRecord>>,
    pub users: Vec<UserRecord>,
    pub assignments: Mutex<Vec<AssignmentRequest>>,
    pub resolve_requests: Mutex<Vec<ReviewStatusUpdate>>,
    pub resolve_failures: Mutex<usize>,
    pub upload_delay: Mutex<Option<Duration>>,
    pub submit_delay: Mutex<Option<Duration>>,
    pub source_missing: Mutex<bool>,
    pub upload_calls: Arc<Mutex<usize>>,
    pub submit_calls: Arc<Mutex<usize>>,
}

impl InMemoryPortal {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            reviews: Mutex::new(Vec::new()),
            users: vec![
                UserRecord {
                    id: 1,
                    username: "asha".to_string(),
                },
                UserRecord {
                    id: 2,
                    username: "bruno".to_string(),
                },
                UserRecord {
                    id: 3,
                    username: "chen".to_string(),
                },
            ],
            assignments: Mutex::new(Vec::new()),
            resolve_requests: Mutex::new(Vec::new()),
            resolve_failures: Mutex::new(0),
            upload_delay: Mutex::new(None),
            submit_delay: Mutex::new(None),
            source_missing: Mutex::new(false),
            upload_calls: Arc::new(Mutex::new(0)),
            submit_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn seed_review(&self, question_id: QuestionId, edited: Option<&str>, status: Option<&str>) {
        self.reviews.lock().unwrap().push(ReviewRecord {
            question_id,
            question_text: Some(format!("question {question_id}")),
            response: Some("R".to_string()),
            modified_response: edited.map(str::to_string),
            timestamp: Some("2024-05-01T10:00:00".to_string()),
            user: Some(ReviewUser {
                username: Some("asha".to_string()),
            }),
            status: status.map(str::to_string),
        });
    }

    pub fn review_status(&self, question_id: QuestionId) -> Option<String> {
        self.reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.question_id == question_id)
            .and_then(|r| r.status.clone())
    }

    pub fn get_upload_calls(&self) -> usize {
        *self.upload_calls.lock().unwrap()
    }

    pub fn get_submit_calls(&self) -> usize {
        *self.submit_calls.lock().unwrap()
    }

    pub fn get_resolve_calls(&self) -> usize {
        self.resolve_requests.lock().unwrap().len()
    }
}

impl Default for InMemoryPortal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceService for InMemoryPortal {
    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadResponse, SdkError> {
        *self.upload_calls.lock().unwrap() += 1;
        let delay = *self.upload_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut documents = self.documents.lock().unwrap();
        let rfp_id = match upload.rfp_id {
            Some(rfp_id) if documents.contains_key(&rfp_id) => rfp_id,
            Some(rfp_id) => return Err(SdkError::not_found(format!("RFP {rfp_id}"))),
            None => documents.keys().max().copied().unwrap_or(0) + 1,
        };
        let document = documents.entry(rfp_id).or_insert_with(|| StoredDocument {
            name: upload.rfp_name.clone(),
            source: upload.content.clone(),
            versions: Vec::new(),
        });
        let version = VersionNumber::new(format!("{}.0", document.versions.len() + 1));
        let artifact = format!("artifact of {} v{}", document.name, version).into_bytes();
        document.versions.push((version.clone(), artifact));

        Ok(UploadResponse {
            message: Some("RFP processed successfully".to_string()),
            download_path: None,
            rfpid: Some(rfp_id),
            version: Some(version),
        })
    }

    async fn download_artifact(&self, rfp_id: RfpId) -> Result<Vec<u8>, SdkError> {
        self.documents
            .lock()
            .unwrap()
            .get(&rfp_id)
            .and_then(|doc| doc.versions.last())
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| SdkError::not_found(format!("RFP {rfp_id}")))
    }

    async fn download_artifact_version(
        &self,
        rfp_id: RfpId,
        version: &VersionNumber,
    ) -> Result<Vec<u8>, SdkError> {
        self.documents
            .lock()
            .unwrap()
            .get(&rfp_id)
            .and_then(|doc| doc.versions.iter().find(|(v, _)| v == version))
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| SdkError::not_found(format!("RFP {rfp_id} version {version}")))
    }

    async fn fetch_source_file(&self, rfp_id: RfpId) -> Result<Vec<u8>, SdkError> {
        if *self.source_missing.lock().unwrap() {
            return Err(SdkError::api_error(500, "storage offline".to_string()));
        }
        self.documents
            .lock()
            .unwrap()
            .get(&rfp_id)
            .map(|doc| doc.source.clone())
            .ok_or_else(|| SdkError::not_found(format!("RFP {rfp_id}")))
    }

    async fn search_documents(
        &self,
        _user_id: UserId,
        query: &str,
    ) -> Result<Vec<RfpRecord>, SdkError> {
        let needle = query.to_lowercase();
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, doc)| doc.name.to_lowercase().contains(&needle))
            .map(|(rfp_id, doc)| RfpRecord {
                rfpid: Some(*rfp_id),
                rfpname: Some(doc.name.clone()),
                last_updated: Some("2024-05-01T10:00:00".to_string()),
                uploaded_by: Some("asha".to_string()),
                version: doc.versions.last().map(|(v, _)| v.clone()),
            })
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, SdkError> {
        Ok(self.users.clone())
    }

    async fn assign_document(&self, assignment: AssignmentRequest) -> Result<(), SdkError> {
        self.assignments.lock().unwrap().push(assignment);
        Ok(())
    }

    async fn submit_review(&self, submission: ReviewSubmission) -> Result<ReviewAck, SdkError> {
        *self.submit_calls.lock().unwrap() += 1;
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut reviews = self.reviews.lock().unwrap();
        let question_id = reviews.iter().map(|r| r.question_id).max().unwrap_or(0) + 1;
        reviews.push(ReviewRecord {
            question_id,
            question_text: Some(submission.question_text),
            response: Some(submission.review_answer),
            modified_response: submission.modified_response,
            timestamp: Some("2024-05-01T10:00:00Z".to_string()),
            user: Some(ReviewUser {
                username: Some(format!("user-{}", submission.user_id)),
            }),
            status: None,
        });
        Ok(ReviewAck {
            question_id: Some(question_id),
            message: Some("Review saved".to_string()),
        })
    }

    async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, SdkError> {
        Ok(self.reviews.lock().unwrap().clone())
    }

    async fn resolve_review(&self, update: ReviewStatusUpdate) -> Result<StatusAck, SdkError> {
        self.resolve_requests.lock().unwrap().push(update.clone());

        {
            let mut failures = self.resolve_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(SdkError::api_error(500, "database busy".to_string()));
            }
        }

        let mut reviews = self.reviews.lock().unwrap();
        let record = reviews
            .iter_mut()
            .find(|r| r.question_id == update.question_id)
            .ok_or_else(|| SdkError::not_found(format!("question {}", update.question_id)))?;
        if record.status.as_deref().is_some_and(|s| !s.is_empty()) {
            return Err(SdkError::conflict("Question already reviewed"));
        }
        record.status = Some(update.status.to_string());
        Ok(StatusAck {
            message: Some("Status updated".to_string()),
        })
    }
}

pub struct TestHarness {
    pub workflow: Workflow,
    pub categorizer: Arc<MockCategorizer>,
    pub generator: Arc<MockGenerator>,
    pub portal: Arc<InMemoryPortal>,
}

pub fn harness(categorizer: MockCategorizer, generator: MockGenerator) -> TestHarness {
    let categorizer = Arc::new(categorizer);
    let generator = Arc::new(generator);
    let portal = Arc::new(InMemoryPortal::new());
    let workflow = Workflow::new(
        categorizer.clone(),
        generator.clone(),
        portal.clone(),
        Taxonomy::builtin(),
        test_user(),
    );
    TestHarness {
        workflow,
        categorizer,
        generator,
        portal,
    }
}

pub fn default_harness() -> TestHarness {
    harness(
        MockCategorizer::new(&["Compliance", "Security"]).predicting(Value::from("Compliance")),
        MockGenerator::new("R"),
    )
}
