//! RFP document commands

use anyhow::Context;
use rfp_sdk::types::VersionNumber;
use rfp_workflow::documents::{RfpDocument, RfpVersion, SourceDocument};
use rfp_workflow::WorkflowConfig;
use std::path::{Path, PathBuf};

use super::Connected;
use crate::error::CliError;

/// `<name>_v<version>.xlsx` next to the current directory
fn default_output(name: &str, version: &RfpVersion) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    PathBuf::from(format!("{stem}_v{}.xlsx", version.version))
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write artifact to {}", path.display()))?;
    println!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

pub async fn upload(
    config: &WorkflowConfig,
    file: &Path,
    name: Option<&str>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let document = SourceDocument::from_path(file)?;

    let connected = Connected::open(config)?;
    let workflow = &connected.workflow;
    let mut metadata = workflow.documents().upload_metadata_for(&document.file_name);
    if let Some(name) = name {
        metadata.name = name.to_string();
    }
    let rfp_name = metadata.name.clone();

    let result = match workflow.documents().inspect(&document) {
        Ok(summary) => {
            println!("Found {} questions in {}", summary.queries.len(), document.file_name);
            workflow.upload_and_download(document, metadata).await
        }
        Err(e) => Err(e),
    };
    connected.close().await;

    let (version, bytes) = result?;
    println!("RFP {} stored as version {}", version.rfp_id, version.version);
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(&rfp_name, &version));
    write_artifact(&path, &bytes)
}

pub async fn regenerate(
    config: &WorkflowConfig,
    rfp_id: i64,
    name: &str,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let document = RfpDocument {
        rfp_id,
        name: name.to_string(),
        uploaded_by: config.user.user_name.clone(),
    };

    let connected = Connected::open(config)?;
    let result = connected.workflow.regenerate_and_download(&document).await;
    connected.close().await;

    let (version, bytes) = result?;
    println!("RFP {} regenerated as version {}", version.rfp_id, version.version);
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(name, &version));
    write_artifact(&path, &bytes)
}

pub async fn download(
    config: &WorkflowConfig,
    rfp_id: i64,
    version: Option<&str>,
    output: &Path,
) -> Result<(), CliError> {
    let version = version.map(VersionNumber::new);

    let connected = Connected::open(config)?;
    let result = connected.workflow.download(rfp_id, version.as_ref()).await;
    connected.close().await;

    write_artifact(output, &result?)
}

pub async fn search(config: &WorkflowConfig, query: &str) -> Result<(), CliError> {
    let connected = Connected::open(config)?;
    let result = connected.workflow.search(query).await;
    connected.close().await;

    let documents = result?;
    if documents.is_empty() {
        println!("No RFPs found");
        return Ok(());
    }

    println!("{:<8} {:<32} {:<10} {:<16} UPDATED", "ID", "NAME", "VERSION", "UPLOADED BY");
    for document in documents {
        println!(
            "{:<8} {:<32} {:<10} {:<16} {}",
            document.rfp_id,
            document.name,
            document
                .version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string()),
            document.uploaded_by.as_deref().unwrap_or("-"),
            document
                .last_updated
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

pub async fn users(config: &WorkflowConfig) -> Result<(), CliError> {
    let connected = Connected::open(config)?;
    let result = connected.workflow.assignable_users().await;
    connected.close().await;

    for user in result? {
        println!("{:<8} {}", user.id, user.username);
    }
    Ok(())
}

pub async fn assign(config: &WorkflowConfig, rfp_id: i64, user_id: i64) -> Result<(), CliError> {
    let connected = Connected::open(config)?;
    let result = connected.workflow.assign(rfp_id, user_id).await;
    connected.close().await;

    result?;
    println!("RFP {rfp_id} assigned to user {user_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_artifact_names_the_path_on_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");

        let err = write_artifact(&path, b"artifact").unwrap_err();

        assert!(matches!(err, CliError::Other(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("out.xlsx"));
    }

    #[test]
    fn test_write_artifact() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");

        write_artifact(&path, b"artifact").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"artifact");
    }

    #[test]
    fn test_default_output_sanitizes_name() {
        let version = RfpVersion {
            rfp_id: 4,
            version: VersionNumber::new("2.0"),
        };
        assert_eq!(
            default_output("Bank RFP/2024", &version),
            PathBuf::from("Bank_RFP_2024_v2.0.xlsx")
        );
    }
}
