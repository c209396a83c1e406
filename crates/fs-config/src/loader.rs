//! Configuration loader with file and environment variable support

use crate::{ConfigError, SeederConfig};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "fixture-seeder.toml",
    "config.toml",
    "./config/fixture-seeder.toml",
];

const ENV_PREFIX: &str = "FIXTURE_SEEDER";

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path.
    ///
    /// Unlike the search paths, an explicit path that does not exist is an error.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found), apply environment overrides, validate.
    pub fn load(&self) -> Result<SeederConfig, ConfigError> {
        self.load_with_env(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<SeederConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.find_config_file(&lookup)? {
            Some(path) => {
                info!(?path, "Loading configuration from file");
                SeederConfig::from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                SeederConfig::default()
            }
        };

        apply_env_overrides(&mut config, &lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Ok(Some(path.clone()));
            }
            return Err(ConfigError::ValidationError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }

        if let Some(path) = lookup("FIXTURE_SEEDER_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(ConfigError::EnvError(format!(
                "FIXTURE_SEEDER_CONFIG points to missing file {}",
                path.display()
            )));
        }

        Ok(CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment variable holding the password override for a principal.
///
/// `flinkuser` -> `FIXTURE_SEEDER_FLINKUSER_PASSWORD`, `ci-reader` -> `FIXTURE_SEEDER_CI_READER_PASSWORD`.
pub fn env_key_for_principal(name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{}_{}_PASSWORD", ENV_PREFIX, normalized)
}

fn apply_env_overrides<F>(config: &mut SeederConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // MongoDB
    if let Some(val) = lookup("FIXTURE_SEEDER_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("FIXTURE_SEEDER_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }
    if let Some(val) = lookup("FIXTURE_SEEDER_CONNECT_TIMEOUT_MS") {
        config.mongodb.connect_timeout_ms = val.trim().parse().map_err(|_| {
            ConfigError::EnvError(format!("FIXTURE_SEEDER_CONNECT_TIMEOUT_MS is not a number: {val}"))
        })?;
    }

    // General
    if let Some(val) = lookup("FIXTURE_SEEDER_REPORT_STATUS") {
        config.report_status = val.trim().parse().map_err(|_| {
            ConfigError::EnvError(format!("FIXTURE_SEEDER_REPORT_STATUS is not a boolean: {val}"))
        })?;
    }

    // Per-principal passwords
    for principal in &mut config.principals {
        let key = env_key_for_principal(&principal.name);
        if let Some(val) = lookup(&key) {
            debug!(principal = %principal.name, env = %key, "Password overridden from environment");
            principal.password = val;
        }
    }

    Ok(())
}
