use rfp_workflow::WorkflowError;
use std::fmt;

/// Main error type for the rfp CLI
#[derive(Debug)]
pub enum CliError {
    /// Configuration-related errors
    Config(String),
    /// Rejected before reaching any service
    Invalid(WorkflowError),
    /// A service call failed
    Workflow(WorkflowError),
    /// Generic errors from anyhow
    Other(anyhow::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
            CliError::Invalid(err) => write!(f, "{}", err.user_message()),
            CliError::Workflow(err) => write!(f, "{}", err.user_message()),
            CliError::Other(err) => write!(f, "Error: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Invalid(err) | CliError::Workflow(err) => Some(err),
            CliError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl CliError {
    /// Get the exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Invalid(_) => 4,
            CliError::Workflow(WorkflowError::AlreadyResolved { .. }) => 6,
            CliError::Workflow(_) => 5,
            CliError::Other(_) => 1,
        }
    }
}

impl From<WorkflowError> for CliError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Config(e) => CliError::Config(e.to_string()),
            err if err.is_local() => CliError::Invalid(err),
            err => CliError::Workflow(err),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_errors_map_to_exit_codes() {
        assert_eq!(CliError::from(WorkflowError::validation("empty")).exit_code(), 4);
        assert_eq!(CliError::from(WorkflowError::UploadInProgress).exit_code(), 4);
        assert_eq!(CliError::from(WorkflowError::download("404")).exit_code(), 5);
        assert_eq!(
            CliError::from(WorkflowError::AlreadyResolved { question_id: 3 }).exit_code(),
            6
        );
    }
}
