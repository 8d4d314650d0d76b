use crate::error::CliError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter from `RUST_LOG`, else `debug` when verbose, else `level`
fn build_filter(verbose: bool, level: &str) -> Result<EnvFilter, CliError> {
    let default_level = if verbose { "debug" } else { level };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| CliError::Config(format!("Failed to create log filter: {}", e)))
}

/// Initialize logging with environment-based log level filtering
pub fn init_logging(verbose: bool, level: &str) -> Result<(), CliError> {
    let env_filter = build_filter(verbose, level)?;

    // Logs go to stderr so command output stays pipeable
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
