use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tasktracker_api::{FileSessionStore, TaskTrackerClient};
use tasktracker_config::ConfigError;
use tasktracker_core::{SessionStore, TaskTrackerApi};
use tasktracker_ui::{Shell, Ui};
use tokio::runtime::Handle;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli_flags()?;
    let config = match &cli.config_path {
        Some(path) => tasktracker_config::load_from_path(path)?,
        None => tasktracker_config::load_from_env()?,
    };
    init_file_logging(&config.session_token_path)?;
    tracing::info!(api_base_url = config.api_base_url.as_str(), "starting client");

    let api: Arc<dyn TaskTrackerApi> =
        Arc::new(TaskTrackerClient::new(config.api_base_url.clone())?);
    let session: Arc<dyn SessionStore> =
        Arc::new(FileSessionStore::new(config.session_token_path.as_str()));

    let mut shell = Shell::new(api, session, Handle::current());
    let mut ui = Ui::init()?;
    ui.run(&mut shell, Duration::from_millis(config.ui.tick_millis))?;

    Ok(())
}

/// Logs go next to the session token file rather than the terminal, which
/// the alternate screen owns while the client runs.
fn init_file_logging(session_token_path: &str) -> Result<(), ConfigError> {
    let log_path = log_file_path(session_token_path);
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|error| {
                ConfigError::Message(format!(
                    "failed to create log directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|error| {
            ConfigError::Message(format!(
                "failed to open log file '{}': {error}",
                log_path.display()
            ))
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}

fn log_file_path(session_token_path: &str) -> PathBuf {
    let token_file = Path::new(session_token_path);
    token_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join("tasktracker.log")
}

#[derive(Debug, Default)]
struct CliFlags {
    config_path: Option<PathBuf>,
}

fn parse_cli_flags() -> Result<CliFlags, ConfigError> {
    let mut flags = CliFlags::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or_else(|| {
                    ConfigError::Message(
                        "Missing value after --config. Use --config <path>.".to_owned(),
                    )
                })?;
                if value.trim().is_empty() {
                    return Err(ConfigError::Message(
                        "Flag '--config' requires a non-empty value.".to_owned(),
                    ));
                }
                flags.config_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print_cli_help();
                std::process::exit(0);
            }
            value if value.starts_with("--") => {
                return Err(ConfigError::Message(format!(
                    "Unknown flag '{value}'. Run with --help for valid flags."
                )));
            }
            unknown => {
                return Err(ConfigError::Message(format!(
                    "Unexpected argument '{unknown}'. Run with --help for valid flags."
                )));
            }
        }
    }

    Ok(flags)
}

fn print_cli_help() {
    println!("Usage: tasktracker-app [--config <path>]");
    println!();
    println!("  --config <path>   Read configuration from <path> instead of the default location");
    println!("  --help            Show this help message");
}
