use std::path::Path;

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Layered config loading: an optional file named by `FILE_VAR`, then
/// `APP_`-prefixed environment variables on top (`APP_DATABASE__URL` maps to
/// `database.url`).
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";
    // Deliberately outside `PREFIX`, or it would be read back as a config key.
    const FILE_VAR: &'static str = "TODO_API_CONFIG";

    fn load_dotenv() {
        // Load .env from crate root (falls back to current dir if missing)
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn environment() -> config_rs::Environment {
        config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();
        let file = std::env::var(Self::FILE_VAR).ok();
        Self::load(file.as_deref(), Self::environment())
    }

    fn load(file: Option<&str>, environment: config_rs::Environment) -> Result<Self> {
        let mut builder = config_rs::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config_rs::File::with_name(path).required(true));
        }

        let settings = builder
            .add_source(environment)
            .build()
            .context("failed to read config sources")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize config")?;

        cfg.validate()?;
        Ok(cfg)
    }
}
