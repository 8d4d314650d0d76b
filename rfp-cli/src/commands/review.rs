//! Review queue commands

use rfp_sdk::types::ReviewDecision;
use rfp_workflow::{DiffSpan, DiffTag, ReviewDiff, WorkflowConfig, WorkflowError};

use super::Connected;
use crate::cli::ReviewCommands;
use crate::error::CliError;

/// Inline rendering: `[-removed-]` and `{+added+}`
fn render_spans(spans: &[DiffSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        match span.tag {
            DiffTag::Unchanged => out.push_str(&span.text),
            DiffTag::Removed => {
                out.push_str("[-");
                out.push_str(&span.text);
                out.push_str("-]");
            }
            DiffTag::Added => {
                out.push_str("{+");
                out.push_str(&span.text);
                out.push_str("+}");
            }
        }
    }
    out
}

pub async fn handle_review_command(
    config: &WorkflowConfig,
    action: &ReviewCommands,
) -> Result<(), CliError> {
    let connected = Connected::open(config)?;
    let result = match action {
        ReviewCommands::List => list(&connected).await,
        ReviewCommands::Diff { question_id } => show_diff(&connected, *question_id).await,
        ReviewCommands::Accept { question_id } => {
            resolve(&connected, *question_id, ReviewDecision::Accept).await
        }
        ReviewCommands::Reject { question_id } => {
            resolve(&connected, *question_id, ReviewDecision::Reject).await
        }
    };
    connected.close().await;
    result
}

async fn list(connected: &Connected) -> Result<(), CliError> {
    let items = connected.workflow.refresh_reviews().await?;
    if items.is_empty() {
        println!("No responses awaiting review");
        return Ok(());
    }

    for item in items {
        println!(
            "#{} {} ({}){}",
            item.question_id,
            item.question_text,
            item.uploader.as_deref().unwrap_or("unknown"),
            item.timestamp
                .map(|t| format!(" {}", t.format("%Y-%m-%d %H:%M")))
                .unwrap_or_default(),
        );
        if item.edited_response.is_some() {
            println!("    edited");
        }
    }
    Ok(())
}

async fn show_diff(connected: &Connected, question_id: i64) -> Result<(), CliError> {
    connected.workflow.refresh_reviews().await?;
    let diff = connected.workflow.review_diff(question_id).ok_or_else(|| {
        CliError::Invalid(WorkflowError::validation(format!(
            "Question {question_id} is not awaiting review"
        )))
    })?;

    match &diff {
        ReviewDiff::Edited(spans) => println!("{}", render_spans(spans)),
        ReviewDiff::Unedited => println!("{}", diff.placeholder().unwrap_or_default()),
    }
    Ok(())
}

async fn resolve(
    connected: &Connected,
    question_id: i64,
    decision: ReviewDecision,
) -> Result<(), CliError> {
    connected.workflow.refresh_reviews().await?;
    connected.workflow.resolve_review(question_id, decision).await?;
    println!("Question {question_id}: {decision}ed");
    Ok(())
}
