use clap::{Parser, Subcommand};
use rfp_workflow::config::get_config_path;
use rfp_workflow::WorkflowConfig;
use std::path::PathBuf;

use crate::{commands, error::CliError};

#[derive(Debug, Parser)]
#[command(name = "rfp")]
#[command(about = "Answer RFP questions and manage RFP documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the categories known to the portal
    Categories,

    /// Categorize a question, generate a response and optionally send it for review
    Ask {
        /// The RFP question
        query: String,

        /// Use this category instead of predicting one
        #[arg(short, long)]
        category: Option<String>,

        /// Replace the generated response with this text before review
        #[arg(short, long)]
        edit: Option<String>,

        /// Send the (edited) response for review
        #[arg(long)]
        submit: bool,
    },

    /// Polish an existing response
    Enrich {
        /// The RFP question the response answers
        query: String,

        /// Response to enrich
        response: String,

        #[arg(short, long)]
        category: Option<String>,
    },

    /// Upload a spreadsheet with a `query` column
    Upload {
        file: PathBuf,

        /// RFP name (defaults to the file name without extension)
        #[arg(short, long)]
        name: Option<String>,

        /// Where to write the generated spreadsheet
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a new version of an existing RFP
    Regenerate {
        rfp_id: i64,

        /// RFP name as shown by `search`
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the generated spreadsheet of an RFP
    Download {
        rfp_id: i64,

        /// Specific version, e.g. 2.0 (defaults to the latest)
        #[arg(long)]
        version: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Search RFPs visible to the configured user
    Search {
        #[arg(default_value = "")]
        query: String,
    },

    /// List users an RFP can be assigned to
    Users,

    /// Share an RFP with another user
    Assign { rfp_id: i64, user_id: i64 },

    /// Review queue operations
    Review {
        #[command(subcommand)]
        action: ReviewCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReviewCommands {
    /// List responses awaiting review
    List,

    /// Show the edit made to a response
    Diff { question_id: i64 },

    /// Accept a response
    Accept { question_id: i64 },

    /// Reject a response
    Reject { question_id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(get_config_path)
    }

    pub fn load_config(&self) -> Result<WorkflowConfig, CliError> {
        WorkflowConfig::load_from(&self.config_path()).map_err(|e| CliError::Config(e.to_string()))
    }

    pub async fn run(&self, config: WorkflowConfig) -> Result<(), CliError> {
        match &self.command {
            Commands::Categories => commands::ask::list_categories(&config).await,
            Commands::Ask {
                query,
                category,
                edit,
                submit,
            } => {
                commands::ask::ask(&config, query, category.as_deref(), edit.as_deref(), *submit)
                    .await
            }
            Commands::Enrich {
                query,
                response,
                category,
            } => commands::ask::enrich(&config, query, response, category.as_deref()).await,
            Commands::Upload { file, name, output } => {
                commands::documents::upload(&config, file, name.as_deref(), output.as_deref())
                    .await
            }
            Commands::Regenerate {
                rfp_id,
                name,
                output,
            } => commands::documents::regenerate(&config, *rfp_id, name, output.as_deref()).await,
            Commands::Download {
                rfp_id,
                version,
                output,
            } => {
                commands::documents::download(&config, *rfp_id, version.as_deref(), output).await
            }
            Commands::Search { query } => commands::documents::search(&config, query).await,
            Commands::Users => commands::documents::users(&config).await,
            Commands::Assign { rfp_id, user_id } => {
                commands::documents::assign(&config, *rfp_id, *user_id).await
            }
            Commands::Review { action } => commands::review::handle_review_command(&config, action).await,
            Commands::Config { action } => {
                commands::config::handle_config_command(&config, &self.config_path(), action)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "rfp",
            "ask",
            "vendor SLA terms",
            "--category",
            "Compliance",
            "--edit",
            "R'",
            "--submit",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask {
                query,
                category,
                edit,
                submit,
            } => {
                assert_eq!(query, "vendor SLA terms");
                assert_eq!(category.as_deref(), Some("Compliance"));
                assert_eq!(edit.as_deref(), Some("R'"));
                assert!(submit);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_review_accept_with_global_flags() {
        let cli =
            Cli::try_parse_from(["rfp", "review", "accept", "7", "--verbose", "--config", "x.toml"])
                .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config_path(), PathBuf::from("x.toml"));
        assert!(matches!(
            cli.command,
            Commands::Review {
                action: ReviewCommands::Accept { question_id: 7 }
            }
        ));
    }

    #[test]
    fn test_download_requires_output() {
        assert!(Cli::try_parse_from(["rfp", "download", "3"]).is_err());
        assert!(Cli::try_parse_from(["rfp", "download", "3", "-o", "out.xlsx", "--version", "2.0"]).is_ok());
    }

    #[test]
    fn test_load_config_from_flag() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path_arg = path.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["rfp", "--config", path_arg.as_str(), "config", "path"]).unwrap();

        let config = cli.load_config().unwrap();

        assert!(path.exists());
        assert_eq!(config.user.user_id, 1);
    }
}
