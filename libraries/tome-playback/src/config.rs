/// Session configuration
use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tome_storage::JsonFileStore;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Rewind/forward step
    #[serde(default = "default_skip_ms")]
    pub skip_ms: u64,

    /// Progress ticker period
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl SessionConfig {
    /// Load configuration from `tome.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::build(Some(PathBuf::from("tome.toml")).filter(|p| p.exists()))
    }

    /// Load configuration from an explicit file, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref().to_path_buf()))
    }

    fn build(file: Option<PathBuf>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = file {
            settings = settings.add_source(config::File::from(path));
        }

        // Override with environment variables (TOME_SKIP_MS, ...)
        settings = settings.add_source(config::Environment::with_prefix("TOME").try_parsing(true));

        let config: Self = settings
            .build()
            .map_err(|e| SessionError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SessionError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.skip_ms == 0 {
            return Err(SessionError::Config(
                "skip_ms must be greater than zero".to_string(),
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err(SessionError::Config(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Open the JSON snapshot store at `store_path`
    pub fn open_store(&self) -> tome_core::Result<JsonFileStore> {
        JsonFileStore::open(&self.store_path)
    }
}

// Default values
fn default_skip_ms() -> u64 {
    10_000
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/sessions.json")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            skip_ms: default_skip_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            store_path: default_store_path(),
        }
    }
}
