use rfp_workflow::WorkflowConfig;
use std::path::Path;

use crate::cli::ConfigCommands;
use crate::error::CliError;

/// Handle config subcommands
pub fn handle_config_command(
    config: &WorkflowConfig,
    path: &Path,
    action: &ConfigCommands,
) -> Result<(), CliError> {
    match action {
        ConfigCommands::Show => {
            let rendered = config
                .to_toml()
                .map_err(|e| CliError::Config(format!("Failed to render configuration: {e}")))?;
            println!("# {}", path.display());
            println!("{rendered}");
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}
