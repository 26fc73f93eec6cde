use super::ConfigError;
use std::path::PathBuf;

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    if let Ok(root) = std::env::var("COXSWAIN_STATE_ROOT") {
        if !root.trim().is_empty() {
            return Ok(PathBuf::from(root));
        }
    }
    let home = std::env::var("HOME")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(".coxswain"))
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("COXSWAIN_CONFIG") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    Ok(default_state_root()?.join("config.yaml"))
}
