//! Question answering commands

use rfp_workflow::{Workflow, WorkflowConfig};

use super::Connected;
use crate::error::CliError;

pub async fn list_categories(config: &WorkflowConfig) -> Result<(), CliError> {
    let connected = Connected::open(config)?;
    let result = connected.workflow.load_categories().await;
    connected.close().await;

    for name in result? {
        println!("{name}");
    }
    Ok(())
}

pub async fn ask(
    config: &WorkflowConfig,
    query: &str,
    category: Option<&str>,
    edit: Option<&str>,
    submit: bool,
) -> Result<(), CliError> {
    let connected = Connected::open(config)?;
    let result = run_ask(&connected.workflow, query, category, edit, submit).await;
    connected.close().await;
    result
}

async fn run_ask(
    workflow: &Workflow,
    query: &str,
    category: Option<&str>,
    edit: Option<&str>,
    submit: bool,
) -> Result<(), CliError> {
    workflow.set_query(query)?;

    let description = match category {
        Some(category) => {
            // Keep the portal's names in the session set alongside ours
            if let Err(e) = workflow.load_categories().await {
                tracing::warn!(error = %e, "Continuing without the category list");
            }
            workflow.select_category(category)?
        }
        None => {
            workflow.categorize().await?;
            workflow.context().category_description
        }
    };

    let context = workflow.context();
    println!("Category: {}", context.category.as_deref().unwrap_or_default());
    for line in &description {
        println!("  {line}");
    }

    let generated = workflow.generate().await?;
    println!();
    println!("Response:");
    println!("{}", generated.response_text);

    let context = workflow.context();
    if let Some(message) = &context.similarity_error {
        println!();
        println!("Similar questions unavailable: {message}");
    } else if !context.precedents.is_empty() {
        println!();
        println!("Similar questions:");
        for precedent in &context.precedents {
            println!("  [{:>3}%] {}", precedent.score_percent(), precedent.question);
            println!("         {}", precedent.answer);
        }
    }

    if let Some(edit) = edit {
        workflow.edit_response(edit)?;
    }

    if submit {
        let receipt = workflow.submit_for_review().await?;
        match receipt.question_id {
            Some(id) => println!("\nSent for review (question {id})"),
            None => println!("\nSent for review"),
        }
    }

    Ok(())
}

pub async fn enrich(
    config: &WorkflowConfig,
    query: &str,
    response: &str,
    category: Option<&str>,
) -> Result<(), CliError> {
    let connected = Connected::open(config)?;
    let result = connected
        .workflow
        .enrich(query, category.unwrap_or_default(), response)
        .await;
    connected.close().await;

    println!("{}", result?);
    Ok(())
}
