#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{0}")]
    Settings(String),
    #[error("unknown server `{name}`; configured servers: {known}")]
    UnknownServer { name: String, known: String },
    #[error("failed to resolve home directory for config path")]
    HomeDirectoryUnavailable,
}
