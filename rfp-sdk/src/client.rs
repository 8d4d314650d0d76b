use crate::{
    error::SdkError,
    types::{
        AssignmentRequest, CategoryRecord, DocumentUpload, EnrichRequest, EnrichResponse,
        GenerateRequest, GenerateResponse, PredictCategoryResponse, ReviewAck, ReviewRecord,
        ReviewStatusUpdate, ReviewSubmission, RfpId, RfpRecord, SimilarQuestionsResponse,
        StatusAck, UploadResponse, UserId, UserRecord, VersionNumber,
    },
};
use async_trait::async_trait;

/// Category listing and prediction
#[async_trait]
pub trait CategorizationService: Send + Sync {
    /// Fetch every category known to the portal
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, SdkError>;

    /// Ask the classifier for the most likely category of `query`
    async fn predict_category(&self, query: &str) -> Result<PredictCategoryResponse, SdkError>;
}

/// Answer generation, precedent lookup and enrichment
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_response(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, SdkError>;

    /// Ranked precedents for `query`, best match first
    async fn fetch_similar(&self, query: &str) -> Result<SimilarQuestionsResponse, SdkError>;

    async fn enrich_response(&self, request: EnrichRequest) -> Result<EnrichResponse, SdkError>;
}

/// Storage of RFP documents, their versions and review records
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Upload a spreadsheet; the service fills it and stores a new version
    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadResponse, SdkError>;

    /// Latest generated artifact of a document
    async fn download_artifact(&self, rfp_id: RfpId) -> Result<Vec<u8>, SdkError>;

    /// Generated artifact of one specific version.
    ///
    /// Sent as `?version=` on the download endpoint. Portals that predate
    /// versioned downloads ignore the parameter and return the latest artifact.
    async fn download_artifact_version(
        &self,
        rfp_id: RfpId,
        version: &VersionNumber,
    ) -> Result<Vec<u8>, SdkError>;

    /// Source spreadsheet as originally uploaded
    async fn fetch_source_file(&self, rfp_id: RfpId) -> Result<Vec<u8>, SdkError>;

    async fn search_documents(
        &self,
        user_id: UserId,
        query: &str,
    ) -> Result<Vec<RfpRecord>, SdkError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, SdkError>;

    async fn assign_document(&self, assignment: AssignmentRequest) -> Result<(), SdkError>;

    async fn submit_review(&self, submission: ReviewSubmission) -> Result<ReviewAck, SdkError>;

    /// Every review record, resolved or not
    async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, SdkError>;

    /// Compare-and-set resolution: fails with [`SdkError::Conflict`] when the
    /// record was already resolved
    async fn resolve_review(&self, update: ReviewStatusUpdate) -> Result<StatusAck, SdkError>;
}
