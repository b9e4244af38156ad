//! TOML configuration for the task tracker client. The config file is
//! created with defaults on first run and normalized back to defaults when
//! fields are emptied by hand.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_TASKTRACKER_CONFIG: &str = "TASKTRACKER_CONFIG";

const DEFAULT_API_BASE_URL: &str = "https://task-tracker-backend-5wn1.onrender.com";
const DEFAULT_TICK_MILLIS: u64 = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

impl ConfigError {
    fn configuration(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTrackerConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_session_token_path")]
    pub session_token_path: String,
    #[serde(default)]
    pub ui: UiConfigToml,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfigToml {
    /// Poll timeout of the terminal event loop while idle.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for UiConfigToml {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

impl Default for TaskTrackerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_token_path: default_session_token_path(),
            ui: UiConfigToml::default(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

fn default_session_token_path() -> String {
    default_state_dir().join("token").display().to_string()
}

fn default_tick_millis() -> u64 {
    DEFAULT_TICK_MILLIS
}

fn default_state_dir() -> PathBuf {
    resolve_home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tasktracker")
}

fn resolve_home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = resolve_home_dir().ok_or_else(|| {
        ConfigError::configuration("Unable to resolve home directory from HOME or USERPROFILE")
    })?;

    Ok(home.join(".config").join("tasktracker").join("config.toml"))
}

pub fn load_from_env() -> Result<TaskTrackerConfig, ConfigError> {
    let path = config_path_from_env()?;
    load_from_path(path)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<TaskTrackerConfig, ConfigError> {
    load_or_create_config(path.as_ref())
}

fn config_path_from_env() -> Result<PathBuf, ConfigError> {
    match std::env::var(ENV_TASKTRACKER_CONFIG) {
        Ok(raw) => {
            if raw.trim().is_empty() {
                default_config_path()
            } else {
                Ok(PathBuf::from(raw))
            }
        }
        Err(_) => default_config_path(),
    }
}

fn persist_config(path: &Path, config: &TaskTrackerConfig) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(config).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to serialize TASKTRACKER_CONFIG for {}: {err}",
            path.display()
        ))
    })?;

    std::fs::write(path, rendered.as_bytes()).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to write TASKTRACKER_CONFIG to {}: {err}",
            path.display()
        ))
    })
}

fn load_or_create_config(path: &Path) -> Result<TaskTrackerConfig, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        ConfigError::configuration(format!(
                            "Failed to create parent directory {} for TASKTRACKER_CONFIG: {err}",
                            parent.display()
                        ))
                    })?;
                }
            }

            let default_config = TaskTrackerConfig::default();
            persist_config(path, &default_config)?;
            return Ok(default_config);
        }
        Err(err) => {
            return Err(ConfigError::configuration(format!(
                "Failed to read TASKTRACKER_CONFIG from {}: {err}",
                path.display()
            )));
        }
    };

    let mut config: TaskTrackerConfig = toml::from_str(&raw).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to parse TASKTRACKER_CONFIG from {}: {err}",
            path.display()
        ))
    })?;

    let changed = normalize_config(&mut config);
    if changed {
        persist_config(path, &config)?;
    }

    Ok(config)
}

fn normalize_config(config: &mut TaskTrackerConfig) -> bool {
    let mut changed = false;

    changed |= normalize_non_empty_string(&mut config.api_base_url, default_api_base_url());
    changed |= normalize_non_empty_string(
        &mut config.session_token_path,
        default_session_token_path(),
    );
    if config.ui.tick_millis == 0 {
        config.ui.tick_millis = default_tick_millis();
        changed = true;
    }

    changed
}

fn normalize_non_empty_string(value: &mut String, fallback: String) -> bool {
    if value.trim().is_empty() {
        *value = fallback;
        true
    } else if value.trim() != value {
        *value = value.trim().to_owned();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn with_env_vars<F>(vars: &[(&str, Option<&str>)], test: F)
    where
        F: FnOnce(),
    {
        let _guard = env_lock().lock().expect("env lock");
        let backup = vars
            .iter()
            .map(|(name, _)| ((*name).to_owned(), std::env::var(name).ok()))
            .collect::<Vec<_>>();

        for (name, value) in vars {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }

        test();

        for (name, value) in backup {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "tasktracker-config-{prefix}-{nanos}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).expect("create temp dir");
        path
    }

    fn remove_temp_path(path: &Path) {
        let _ = std::fs::remove_dir_all(path);
    }

    #[test]
    fn load_from_env_creates_default_config_when_missing() {
        let home = unique_temp_dir("home-defaults");
        let expected = home
            .join(".config")
            .join("tasktracker")
            .join("config.toml");

        with_env_vars(
            &[
                ("HOME", Some(home.to_str().expect("home path"))),
                ("USERPROFILE", None),
                (ENV_TASKTRACKER_CONFIG, None),
            ],
            || {
                let config = load_from_env().expect("load defaults");
                assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
                assert_eq!(config.ui.tick_millis, DEFAULT_TICK_MILLIS);
                assert!(expected.exists());
            },
        );

        remove_temp_path(&home);
    }

    #[test]
    fn load_from_env_honors_explicit_config_path() {
        let home = unique_temp_dir("home-explicit");
        let root = unique_temp_dir("explicit-path");
        let explicit = root.join("nested").join("custom.toml");
        let default = home
            .join(".config")
            .join("tasktracker")
            .join("config.toml");

        with_env_vars(
            &[
                ("HOME", Some(home.to_str().expect("home path"))),
                ("USERPROFILE", None),
                (
                    ENV_TASKTRACKER_CONFIG,
                    Some(explicit.to_str().expect("config path")),
                ),
            ],
            || {
                let config = load_from_env().expect("load explicit path");
                assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
                assert!(explicit.exists());
                assert!(!default.exists());
            },
        );

        remove_temp_path(&home);
        remove_temp_path(&root);
    }

    #[test]
    fn load_from_path_returns_parse_error_for_invalid_toml() {
        let root = unique_temp_dir("invalid-toml");
        let path = root.join("config.toml");
        std::fs::write(&path, "api_base_url = [not toml").expect("write fixture config");

        let error = load_from_path(&path).expect_err("parse must fail");
        assert!(error.to_string().contains("Failed to parse"));

        remove_temp_path(&root);
    }

    #[test]
    fn empty_fields_are_normalized_back_to_defaults_and_persisted() {
        let root = unique_temp_dir("normalize");
        let path = root.join("config.toml");
        std::fs::write(
            &path,
            "api_base_url = \"  \"\nsession_token_path = \"/tmp/tt-token\"\n\n[ui]\ntick_millis = 0\n",
        )
        .expect("write fixture config");

        let config = load_from_path(&path).expect("load normalized");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.session_token_path, "/tmp/tt-token");
        assert_eq!(config.ui.tick_millis, DEFAULT_TICK_MILLIS);

        let persisted = std::fs::read_to_string(&path).expect("reread config");
        let reparsed: TaskTrackerConfig =
            toml::from_str(&persisted).expect("parse persisted normalized config");
        assert_eq!(reparsed, config);

        remove_temp_path(&root);
    }

    #[test]
    fn custom_base_url_round_trips_unchanged() {
        let root = unique_temp_dir("custom-url");
        let path = root.join("config.toml");
        std::fs::write(&path, "api_base_url = \"http://localhost:4100\"\n")
            .expect("write fixture config");

        let config = load_from_path(&path).expect("load custom url");
        assert_eq!(config.api_base_url, "http://localhost:4100");

        remove_temp_path(&root);
    }
}
