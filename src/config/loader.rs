//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "edulog.toml";

/// Overrides the backend URL when no config file exists
pub const API_URL_ENV: &str = "EDULOG_API_URL";

/// Load configuration from edulog.toml
pub fn load_config() -> Result<Config> {
    let current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;
    let config_path = find_config_file(&current)?;
    load_config_from_path(&config_path)
}

/// Load edulog.toml if one exists, otherwise fall back to defaults
pub fn load_config_or_default() -> Result<Config> {
    match load_config() {
        Ok(config) => Ok(config),
        Err(Error::ConfigNotFound) => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
            let mut config = Config::default();
            if let Ok(url) = env::var(API_URL_ENV) {
                config.api.base_url = url;
            }
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from a specific path. A relative session path is
/// taken relative to the directory holding the file.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let mut config: Config = toml::from_str(&content)?;

    if config.session.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.session.path = dir.join(&config.session.path);
        }
    }
    Ok(config)
}

/// Write configuration to a specific path
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Find the configuration file, searching upward from `start`
pub fn find_config_file(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // Compile-time constant pattern; a failure here is a bug in this file
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# EduLog client configuration

[api]
# Root URL of the EduLog backend
base_url = "${EDULOG_API_URL:-http://127.0.0.1:8000}"

[session]
# File holding the current login between CLI invocations.
# Relative paths are taken from this file's directory.
# Delete it (or run 'edulog logout') to end the session.
path = ".edulog/session.json"
"#
}
