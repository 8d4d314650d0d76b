//! Uploading RFP spreadsheets and tracking the versions the portal creates.

use chrono::{DateTime, Utc};
use rfp_sdk::client::PersistenceService;
use rfp_sdk::types::{
    parse_timestamp, AssignmentRequest, DocumentUpload, RfpId, RfpRecord, UploadResponse, UserId,
    VersionNumber,
};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::UserConfig;
use crate::error::{Result, WorkflowError};
use crate::spreadsheet::{self, SpreadsheetFormat, SpreadsheetSummary};

/// Logical document; identity survives regenerations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfpDocument {
    pub rfp_id: RfpId,
    pub name: String,
    pub uploaded_by: String,
}

/// One stored generation of a document. Versions are assigned by the portal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfpVersion {
    pub rfp_id: RfpId,
    pub version: VersionNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfpSummary {
    pub rfp_id: RfpId,
    pub name: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub uploaded_by: Option<String>,
    pub version: Option<VersionNumber>,
}

impl RfpSummary {
    pub fn document(&self) -> RfpDocument {
        RfpDocument {
            rfp_id: self.rfp_id,
            name: self.name.clone(),
            uploaded_by: self.uploaded_by.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    pub name: String,
    pub uploaded_by: String,
    pub requested_by: UserId,
}

/// Spreadsheet bytes together with the name they were picked under
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl SourceDocument {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).map_err(|e| {
            WorkflowError::validation(format!("Unable to read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, content })
    }
}

/// Clears the in-flight flag when the upload finishes, however it finishes
struct UploadGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> UploadGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WorkflowError::UploadInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct DocumentVersionCoordinator {
    service: Arc<dyn PersistenceService>,
    user: UserConfig,
    uploading: AtomicBool,
}

impl DocumentVersionCoordinator {
    pub fn new(service: Arc<dyn PersistenceService>, user: UserConfig) -> Self {
        Self {
            service,
            user,
            uploading: AtomicBool::new(false),
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::Acquire)
    }

    /// Default metadata for a picked file: the RFP is named after the file stem
    pub fn upload_metadata_for(&self, file_name: &str) -> UploadMetadata {
        let name = Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        UploadMetadata {
            name,
            uploaded_by: self.user.user_name.clone(),
            requested_by: self.user.user_id,
        }
    }

    /// Pre-flight read without contacting any service
    pub fn inspect(&self, document: &SourceDocument) -> Result<SpreadsheetSummary> {
        let format = SpreadsheetFormat::from_file_name(&document.file_name).ok_or_else(|| {
            WorkflowError::validation("Only .xls, .xlsx and .csv files are allowed")
        })?;
        spreadsheet::inspect(format, &document.content)
    }

    /// Upload a new document; the portal assigns its id and first version
    pub async fn upload(
        &self,
        document: SourceDocument,
        metadata: UploadMetadata,
    ) -> Result<RfpVersion> {
        self.submit(document, metadata, None).await
    }

    /// Re-submit the stored source of `document` so the portal appends a version
    pub async fn regenerate(&self, document: &RfpDocument) -> Result<RfpVersion> {
        let _guard = UploadGuard::acquire(&self.uploading)?;

        debug!(rfp_id = document.rfp_id, "Fetching stored source file");
        let content = self
            .service
            .fetch_source_file(document.rfp_id)
            .await
            .map_err(|e| {
                warn!(rfp_id = document.rfp_id, error = %e, "Failed to fetch source file");
                WorkflowError::download(e)
            })?;

        let format = SpreadsheetFormat::sniff(&content);
        let source = SourceDocument::new(
            format!("{}.{}", document.name, format.extension()),
            content,
        );
        let metadata = UploadMetadata {
            name: document.name.clone(),
            uploaded_by: self.user.user_name.clone(),
            requested_by: self.user.user_id,
        };

        let version = self.send(source, metadata, Some(document.rfp_id)).await?;
        if version.rfp_id != document.rfp_id {
            warn!(
                expected = document.rfp_id,
                actual = version.rfp_id,
                "Regeneration reported a different document id"
            );
        }
        Ok(version)
    }

    async fn submit(
        &self,
        document: SourceDocument,
        metadata: UploadMetadata,
        rfp_id: Option<RfpId>,
    ) -> Result<RfpVersion> {
        if metadata.name.trim().is_empty() {
            return Err(WorkflowError::validation("Please enter an RFP name"));
        }
        let summary = self.inspect(&document)?;
        debug!(
            file = %document.file_name,
            format = %summary.format,
            queries = summary.queries.len(),
            "Spreadsheet passed pre-flight checks"
        );

        let _guard = UploadGuard::acquire(&self.uploading)?;
        self.send(document, metadata, rfp_id).await
    }

    /// Performs the upload; the caller holds the upload guard
    async fn send(
        &self,
        document: SourceDocument,
        metadata: UploadMetadata,
        rfp_id: Option<RfpId>,
    ) -> Result<RfpVersion> {
        info!(
            name = %metadata.name,
            file = %document.file_name,
            rfp_id = ?rfp_id,
            "Uploading RFP"
        );

        let response = self
            .service
            .upload_document(DocumentUpload {
                rfp_name: metadata.name.trim().to_string(),
                uploaded_by: metadata.uploaded_by,
                user_id: metadata.requested_by,
                file_name: document.file_name,
                content: document.content,
                rfp_id,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "Upload failed");
                WorkflowError::upload(e)
            })?;

        let version = version_from_response(response)?;
        info!(rfp_id = version.rfp_id, version = %version.version, "Stored new version");
        Ok(version)
    }

    /// Latest artifact; never cached
    pub async fn download(&self, rfp_id: RfpId) -> Result<Vec<u8>> {
        self.service.download_artifact(rfp_id).await.map_err(|e| {
            warn!(rfp_id, error = %e, "Download failed");
            WorkflowError::download(e)
        })
    }

    pub async fn download_version(&self, rfp_id: RfpId, version: &VersionNumber) -> Result<Vec<u8>> {
        self.service
            .download_artifact_version(rfp_id, version)
            .await
            .map_err(|e| {
                warn!(rfp_id, version = %version, error = %e, "Download failed");
                WorkflowError::download(e)
            })
    }

    /// Documents visible to the configured user matching `query`
    pub async fn search(&self, query: &str) -> Result<Vec<RfpSummary>> {
        let records = self
            .service
            .search_documents(self.user.user_id, query.trim())
            .await
            .map_err(WorkflowError::unavailable)?;

        Ok(records.into_iter().filter_map(summary_from_record).collect())
    }

    /// Users a document can be shared with, excluding the requesting user
    pub async fn assignable_users(&self) -> Result<Vec<UserSummary>> {
        let users = self
            .service
            .list_users()
            .await
            .map_err(WorkflowError::unavailable)?;

        Ok(users
            .into_iter()
            .filter(|user| user.id != self.user.user_id)
            .map(|user| UserSummary {
                id: user.id,
                username: user.username,
            })
            .collect())
    }

    pub async fn assign(&self, rfp_id: RfpId, user_id: UserId) -> Result<()> {
        if user_id == self.user.user_id {
            return Err(WorkflowError::validation(
                "Cannot assign a document to yourself",
            ));
        }
        self.service
            .assign_document(AssignmentRequest {
                added_by_user_id: self.user.user_id,
                added_user_id: user_id,
                rfp_id,
            })
            .await
            .map_err(WorkflowError::unavailable)?;
        info!(rfp_id, user_id, "Assigned RFP");
        Ok(())
    }
}

fn version_from_response(response: UploadResponse) -> Result<RfpVersion> {
    let rfp_id = response
        .rfpid
        .ok_or_else(|| WorkflowError::upload("response did not include an rfpid"))?;
    let version = response
        .version
        .ok_or_else(|| WorkflowError::upload("response did not include a version"))?;
    Ok(RfpVersion { rfp_id, version })
}

fn summary_from_record(record: RfpRecord) -> Option<RfpSummary> {
    let Some(rfp_id) = record.rfpid else {
        warn!(name = ?record.rfpname, "Skipping search result without rfpid");
        return None;
    };
    Some(RfpSummary {
        rfp_id,
        name: record.rfpname.unwrap_or_default(),
        last_updated: record.last_updated.as_deref().and_then(parse_timestamp),
        uploaded_by: record.uploaded_by,
        version: record.version,
    })
}
