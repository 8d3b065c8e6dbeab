use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const APP_DIR: &str = "geminiz";
const CONFIG_FILE: &str = "config";

/// The credential and model, resolved once at start-up and then only borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
}

impl Settings {
    /// Resolves settings from the environment and the per-user config file.
    pub fn load(model_override: Option<&str>) -> Result<Self, ConfigError> {
        let path = config_file_path().ok();
        Settings::resolve(
            env::var(API_KEY_VAR).ok(),
            env::var(MODEL_VAR).ok(),
            model_override,
            path.as_deref(),
        )
    }

    /// Applies the lookup order to already-fetched values.
    ///
    /// A non-blank `env_key` wins; otherwise the key comes from `config_file`,
    /// which is `None` when no per-user config directory exists.
    pub fn resolve(
        env_key: Option<String>,
        env_model: Option<String>,
        model_override: Option<&str>,
        config_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let api_key = match non_blank(env_key) {
            Some(key) => {
                debug!("using API key from environment");
                key
            }
            None => load_api_key_at(config_file.ok_or(ConfigError::NoConfigDir)?)?,
        };
        let model = resolve_model(model_override, non_blank(env_model));
        Ok(Settings { api_key, model })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Picks the model from the command line, then the environment, then the default.
pub fn resolve_model(flag: Option<&str>, env_value: Option<String>) -> String {
    flag.map(str::to_string)
        .or(env_value)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Reads the first `GEMINI_API_KEY=value` line from the file at `path`.
pub fn load_api_key_at(path: &Path) -> Result<String, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::MissingApiKey,
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let prefix = format!("{}=", API_KEY_VAR);
    contents
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .inspect(|_| debug!(path = %path.display(), "using API key from config file"))
        .ok_or(ConfigError::MissingApiKey)
}

pub fn save_api_key(api_key: &str) -> Result<PathBuf, ConfigError> {
    let path = config_file_path()?;
    save_api_key_at(&path, api_key)?;
    Ok(path)
}

/// Writes `api_key` to `path`, replacing whatever was there.
pub fn save_api_key_at(path: &Path, api_key: &str) -> Result<(), ConfigError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(ConfigError::EmptyApiKey);
    }

    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, format!("{}={}\n", API_KEY_VAR, api_key)).map_err(io_err)?;
    debug!(path = %path.display(), "saved API key");
    Ok(())
}
