//! Command implementations for the rfp CLI

pub mod ask;
pub mod config;
pub mod documents;
pub mod review;

use rfp_workflow::{Workflow, WorkflowConfig, WorkflowEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::CliError;

/// A workflow whose events are echoed to stderr
pub struct Connected {
    pub workflow: Workflow,
    printer: JoinHandle<()>,
}

impl Connected {
    pub fn open(config: &WorkflowConfig) -> Result<Self, CliError> {
        let mut workflow = Workflow::from_config(config)?;
        let events = workflow.subscribe();
        let printer = tokio::spawn(print_events(events));
        Ok(Self { workflow, printer })
    }

    /// Drop the workflow and wait until every event has been printed
    pub async fn close(self) {
        let Connected { workflow, printer } = self;
        drop(workflow);
        let _ = printer.await;
    }
}

async fn print_events(mut events: mpsc::UnboundedReceiver<WorkflowEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            WorkflowEvent::StateChanged { .. } => tracing::debug!("{event}"),
            event => eprintln!("> {event}"),
        }
    }
}
