use clap::Parser;
use tracing::{debug, info};

mod cli;
mod commands;
mod error;
mod logging;

use cli::Cli;
use error::CliError;
use logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    init_logging(cli.verbose, config.log_level())?;

    info!("rfp CLI starting");
    debug!("CLI arguments: {:?}", cli);

    match cli.run(config).await {
        Ok(_) => {
            debug!("rfp CLI completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("CLI error: {:?}", e);
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
