mod error;
mod paths;
mod settings;

pub use error::ConfigError;
pub use paths::{default_config_path, default_state_root};
pub use settings::{
    MonitorSettings, NotifySettings, ServerEntry, Settings, StorageSettings, DEFAULT_ENGINE_PORT,
};
