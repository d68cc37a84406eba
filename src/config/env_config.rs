use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::errors::DappError;

pub const CONFIG_PATH_ENV: &str = "DAPP_CONFIG_PATH";
pub const NODE_URL_ENV: &str = "DAPP_NODE_URL";
pub const APP_NAME_ENV: &str = "DAPP_APP_NAME";

/// Resolve the config file location: explicit path, then `DAPP_CONFIG_PATH`,
/// then `config.toml` in the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Load the app configuration from TOML and apply environment overrides.
///
/// A missing file is not an error; defaults are used instead. A file that
/// exists but does not parse is.
pub fn load_app_config(explicit: Option<&Path>) -> Result<AppConfig, DappError> {
    let path = config_path(explicit);
    let mut config = match fs::read_to_string(&path) {
        Ok(content) => {
            let parsed: AppConfig = toml::from_str(&content).map_err(|e| {
                DappError::Config(format!("failed to parse {}: {}", path.display(), e))
            })?;
            info!(path = %path.display(), wallets = parsed.wallets.len(), "Loaded config");
            parsed
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found. Using default configuration", path.display());
            AppConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = env::var(NODE_URL_ENV) {
        if !url.trim().is_empty() {
            config.node.url = url.trim().to_string();
        }
    }
    if let Ok(app_name) = env::var(APP_NAME_ENV) {
        if !app_name.trim().is_empty() {
            config.app_name = app_name.trim().to_string();
        }
    }
}
