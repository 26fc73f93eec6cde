use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_ENGINE_PORT: u16 = 8000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub servers: BTreeMap<String, ServerEntry>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub app_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_bucket: Option<String>,
    #[serde(default = "default_query_days")]
    pub query_days: i64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerEntry {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifySettings {
    #[serde(default = "default_notify_domain")]
    pub domain: String,
    #[serde(default = "default_notify_sender")]
    pub sender: String,
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorSettings {
    #[serde(default = "default_monitor_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_submit_grace")]
    pub submit_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_copy_tool")]
    pub copy_tool: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            servers: BTreeMap::from([(
                "localhost".to_string(),
                ServerEntry {
                    host: "localhost".to_string(),
                    port: None,
                },
            )]),
            port: default_port(),
            app_dir: None,
            default_bucket: None,
            query_days: default_query_days(),
            timezone: default_timezone(),
            log_dir: None,
            notify: NotifySettings::default(),
            monitor: MonitorSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            domain: default_notify_domain(),
            sender: default_notify_sender(),
            sendmail_path: default_sendmail_path(),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_monitor_interval(),
            submit_grace_secs: default_submit_grace(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            copy_tool: default_copy_tool(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_ENGINE_PORT
}

fn default_query_days() -> i64 {
    7
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_notify_domain() -> String {
    "localhost".to_string()
}

fn default_notify_sender() -> String {
    "coxswain-noreply".to_string()
}

fn default_sendmail_path() -> String {
    "/usr/sbin/sendmail".to_string()
}

fn default_monitor_interval() -> u64 {
    30
}

fn default_submit_grace() -> u64 {
    5
}

fn default_copy_tool() -> String {
    "gsutil".to_string()
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Settings(
                "`servers` must contain at least one entry".to_string(),
            ));
        }
        for (name, entry) in &self.servers {
            if name.trim().is_empty() {
                return Err(ConfigError::Settings(
                    "`servers` keys must be non-empty".to_string(),
                ));
            }
            if entry.host.trim().is_empty() {
                return Err(ConfigError::Settings(format!(
                    "server `{name}` requires a non-empty `host`"
                )));
            }
            if entry.port == Some(0) {
                return Err(ConfigError::Settings(format!(
                    "server `{name}` port must be > 0"
                )));
            }
        }
        if self.port == 0 {
            return Err(ConfigError::Settings("`port` must be > 0".to_string()));
        }
        if chrono_tz::Tz::from_str(&self.timezone).is_err() {
            return Err(ConfigError::Settings(format!(
                "`timezone` `{}` is not a known IANA timezone",
                self.timezone
            )));
        }
        if let Some(app_dir) = &self.app_dir {
            if !app_dir.is_absolute() {
                return Err(ConfigError::Settings(
                    "`app_dir` must be an absolute path".to_string(),
                ));
            }
        }
        if self.notify.domain.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`notify.domain` must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_server(&self, name: &str) -> Result<(String, u16), ConfigError> {
        let entry = self
            .servers
            .get(name)
            .ok_or_else(|| ConfigError::UnknownServer {
                name: name.to_string(),
                known: self
                    .servers
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;
        Ok((entry.host.clone(), entry.port.unwrap_or(self.port)))
    }

    pub fn timezone(&self) -> chrono_tz::Tz {
        chrono_tz::Tz::from_str(&self.timezone).unwrap_or(chrono_tz::UTC)
    }
}
