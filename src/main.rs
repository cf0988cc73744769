//! Roster CLI entrypoint for account statistics aggregation.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use roster::{IntakeError, RosterConfig};

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    cli::init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ignored = writeln!(io::stderr().lock(), "{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), IntakeError> {
    let config = load_config()?;
    cli::aggregate::run(&config).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`IntakeError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<RosterConfig, IntakeError> {
    RosterConfig::load().map_err(|error| IntakeError::Configuration {
        message: error.to_string(),
    })
}
