use crate::config::{default_config_path, default_state_root, Settings};
use crate::engine::EngineConfig;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    positionals: Vec<String>,
    options: BTreeMap<String, Vec<String>>,
    switches: BTreeSet<String>,
}

impl ParsedArgs {
    pub fn parse(
        args: &[String],
        value_options: &[&str],
        switches: &[&str],
    ) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut index = 0;
        while index < args.len() {
            let token = &args[index];
            let Some(name) = token.strip_prefix("--") else {
                parsed.positionals.push(token.clone());
                index += 1;
                continue;
            };
            if switches.contains(&name) {
                parsed.switches.insert(name.to_string());
                index += 1;
                continue;
            }
            if value_options.contains(&name) {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| format!("option `--{name}` requires a value"))?;
                parsed
                    .options
                    .entry(name.to_string())
                    .or_default()
                    .push(value.clone());
                index += 2;
                continue;
            }
            return Err(format!("unknown option `--{name}`"));
        }
        Ok(parsed)
    }

    pub fn positional(&self, index: usize, name: &str) -> Result<&str, String> {
        self.positionals
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| format!("missing required argument `{name}`"))
    }

    pub fn optional_positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    pub fn values(&self, name: &str) -> Vec<String> {
        self.options.get(name).cloned().unwrap_or_default()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.switches.contains(name)
    }
}

pub fn load_settings() -> Result<Settings, String> {
    let path = default_config_path().map_err(|err| err.to_string())?;
    let settings = Settings::load_or_default(&path).map_err(|err| err.to_string())?;
    settings.validate().map_err(|err| err.to_string())?;
    Ok(settings)
}

pub fn engine_config(settings: &Settings, server: Option<&str>) -> Result<EngineConfig, String> {
    let name = match server {
        Some(name) => name.to_string(),
        None => {
            if settings.servers.len() == 1 {
                settings.servers.keys().next().cloned().unwrap_or_default()
            } else {
                return Err(format!(
                    "`--server` is required; configured servers: {}",
                    settings.servers.keys().cloned().collect::<Vec<_>>().join(", ")
                ));
            }
        }
    };
    let (host, port) = settings.resolve_server(&name).map_err(|err| err.to_string())?;
    Ok(EngineConfig::new(&host, port))
}

pub fn resolve_username(parsed: &ParsedArgs) -> String {
    parsed
        .value("username")
        .map(str::to_string)
        .unwrap_or_else(crate::shared::process_username)
}

pub fn resolve_log_dir(settings: &Settings) -> Option<PathBuf> {
    if let Some(dir) = &settings.log_dir {
        return Some(dir.clone());
    }
    default_state_root().ok().map(|root| root.join("logs"))
}

pub fn parse_u64(raw: &str, name: &str) -> Result<u64, String> {
    raw.parse::<u64>()
        .map_err(|_| format!("`--{name}` expects a non-negative integer, got `{raw}`"))
}

pub fn parse_i64(raw: &str, name: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|_| format!("`--{name}` expects an integer, got `{raw}`"))
}

pub fn render_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
