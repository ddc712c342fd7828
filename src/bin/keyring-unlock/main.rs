use std::io;
use std::process::ExitCode;

use color_eyre::eyre::{eyre, Result as EyreResult};
use keyring_unlock::{control, ControlEndpoint, Secret};

mod cli;
mod logging;

const BUILD_VERSION: &str = env!("KEYRING_UNLOCK_BUILD_VERSION");

#[cfg(debug_assertions)]
fn install_eyre_hook() -> EyreResult<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(true)
        .install()
}

#[cfg(not(debug_assertions))]
fn install_eyre_hook() -> EyreResult<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install()
}

fn main() -> ExitCode {
    if let Err(e) = install_eyre_hook() {
        eprintln!("Failed to install error hook: {}", e);
        return ExitCode::FAILURE;
    }

    let args = cli::Args::parse();

    // Only the top-level message, on a single line
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Args) -> EyreResult<()> {
    let config = cli::Config::load(&args.config_path, args.config)?;

    // LoggerHandle must be held until program termination so file logging takes place
    let _logger = logging::setup_logger(config.log_level.into(), config.log_file.as_deref())?;
    log::info!("Starting keyring-unlock version {}", BUILD_VERSION);

    let secret = Secret::read_from(io::stdin().lock())
        .map_err(|e| eyre!("error reading secret from standard input: {}", e))?;
    log::debug!("Read {} byte secret", secret.len());

    let endpoint = match &config.control_socket {
        Some(path) => ControlEndpoint::from_path(path)?,
        None => ControlEndpoint::resolve()?,
    };
    log::info!("Using control socket {}", endpoint.path().display());

    control::unlock_with_timeout(secret.as_bytes(), &endpoint, config.timeout())?;
    log::info!("Keyring unlocked");

    Ok(())
}
