pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{AppConfig, DatabaseConfig, DeleteMode, GeneralConfig, LoggingConfig, TodoConfig};
pub use envconfig::EnvConfig;
