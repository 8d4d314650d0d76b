use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use super::{
    endpoints,
    response::{bytes_or_error, json_or_error, text_or_error},
    RfpHttpClient,
};
use crate::{
    client::PersistenceService,
    error::SdkError,
    types::{
        AssignmentRequest, DocumentUpload, ReviewAck, ReviewRecord, ReviewStatusUpdate,
        ReviewSubmission, RfpId, RfpRecord, StatusAck, UploadResponse, UserId, UserRecord,
        VersionNumber,
    },
};

fn spreadsheet_mime(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" => endpoints::XLSX_MIME,
        "xls" => "application/vnd.ms-excel",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

impl RfpHttpClient {
    async fn get_bytes(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<u8>, SdkError> {
        let mut headers = self.portal_headers()?;
        headers.insert(ACCEPT, HeaderValue::from_static(endpoints::XLSX_MIME));

        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await?;

        bytes_or_error(response).await
    }
}

#[async_trait]
impl PersistenceService for RfpHttpClient {
    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadResponse, SdkError> {
        let url = self.model_endpoint(endpoints::UPLOAD_RFP);
        info!(
            %url,
            rfp_name = %upload.rfp_name,
            rfp_id = ?upload.rfp_id,
            bytes = upload.content.len(),
            "Uploading RFP document"
        );

        let mime = spreadsheet_mime(&upload.file_name);
        let file_part = Part::bytes(upload.content)
            .file_name(upload.file_name)
            .mime_str(mime)?;

        let mut form = Form::new()
            .text("rfp_name", upload.rfp_name)
            .text("uploaded_by", upload.uploaded_by)
            .text("user_id", upload.user_id.to_string())
            .part("file", file_part);
        if let Some(rfp_id) = upload.rfp_id {
            form = form.text("rfp_id", rfp_id.to_string());
        }

        let response = self.http_client.post(&url).multipart(form).send().await?;

        json_or_error(response).await
    }

    async fn download_artifact(&self, rfp_id: RfpId) -> Result<Vec<u8>, SdkError> {
        let url = self.portal_endpoint(&format!("{}/{}", endpoints::DOWNLOAD, rfp_id));
        debug!(%url, rfp_id, "Downloading artifact");
        self.get_bytes(&url, &[]).await
    }

    async fn download_artifact_version(
        &self,
        rfp_id: RfpId,
        version: &VersionNumber,
    ) -> Result<Vec<u8>, SdkError> {
        let url = self.portal_endpoint(&format!("{}/{}", endpoints::DOWNLOAD, rfp_id));
        debug!(%url, rfp_id, %version, "Downloading artifact version");
        self.get_bytes(&url, &[("version", version.to_string())])
            .await
    }

    async fn fetch_source_file(&self, rfp_id: RfpId) -> Result<Vec<u8>, SdkError> {
        let url = self.portal_endpoint(&format!("{}/{}", endpoints::SOURCE_FILE, rfp_id));
        debug!(%url, rfp_id, "Fetching source file");
        self.get_bytes(&url, &[]).await
    }

    async fn search_documents(
        &self,
        user_id: UserId,
        query: &str,
    ) -> Result<Vec<RfpRecord>, SdkError> {
        let url = self.portal_endpoint(endpoints::SEARCH);
        debug!(%url, user_id, query, "Searching documents");

        let response = self
            .http_client
            .get(&url)
            .headers(self.portal_headers()?)
            .query(&[("userId", user_id.to_string()), ("query", query.to_string())])
            .send()
            .await?;

        json_or_error(response).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, SdkError> {
        let url = self.portal_endpoint(endpoints::USERS);
        debug!(%url, "Listing users");

        let response = self
            .http_client
            .get(&url)
            .headers(self.portal_headers()?)
            .send()
            .await?;

        json_or_error(response).await
    }

    async fn assign_document(&self, assignment: AssignmentRequest) -> Result<(), SdkError> {
        let url = self.portal_endpoint(endpoints::ASSIGN);
        debug!(%url, rfp_id = assignment.rfp_id, user_id = assignment.added_user_id, "Assigning document");

        let response = self
            .http_client
            .post(&url)
            .headers(self.portal_headers()?)
            .json(&assignment)
            .send()
            .await?;

        text_or_error(response).await.map(|_| ())
    }

    async fn submit_review(&self, submission: ReviewSubmission) -> Result<ReviewAck, SdkError> {
        let url = self.portal_endpoint(endpoints::SEND_FOR_REVIEW);
        debug!(%url, user_id = submission.user_id, "Submitting review");

        let response = self
            .http_client
            .post(&url)
            .headers(self.portal_headers()?)
            .json(&submission)
            .send()
            .await?;

        let body = text_or_error(response).await?;
        Ok(serde_json::from_str::<ReviewAck>(&body).unwrap_or_else(|_| ReviewAck {
            question_id: None,
            message: Some(body).filter(|text| !text.trim().is_empty()),
        }))
    }

    async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, SdkError> {
        let url = self.portal_endpoint(endpoints::LIST_REVIEWS);
        debug!(%url, "Listing review records");

        let response = self
            .http_client
            .post(&url)
            .headers(self.portal_headers()?)
            .send()
            .await?;

        json_or_error(response).await
    }

    async fn resolve_review(&self, update: ReviewStatusUpdate) -> Result<StatusAck, SdkError> {
        let url = self.portal_endpoint(endpoints::REVIEW_STATUS);
        debug!(
            %url,
            question_id = update.question_id,
            status = %update.status,
            idempotency_key = %update.idempotency_key,
            "Resolving review"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(self.portal_headers()?)
            .header("Idempotency-Key", update.idempotency_key.to_string())
            .json(&update)
            .send()
            .await?;

        let body = text_or_error(response).await?;
        Ok(serde_json::from_str::<StatusAck>(&body).unwrap_or_else(|_| StatusAck {
            message: Some(body).filter(|text| !text.trim().is_empty()),
        }))
    }
}
