//! Fixture Seeder Configuration
//!
//! TOML-based configuration with environment variable overrides. The defaults
//! reproduce the two principals the CDC integration fixtures expect, so the
//! seeder runs without any file present.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::{env_key_for_principal, ConfigLoader};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Root seeder configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeederConfig {
    pub mongodb: MongoConfig,

    /// Principals to ensure, in seeding order
    pub principals: Vec<PrincipalConfig>,

    /// Query replication status after seeding
    pub report_status: bool,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            mongodb: MongoConfig::default(),
            principals: vec![
                PrincipalConfig {
                    name: "superuser".to_string(),
                    password: "superpw".to_string(),
                    roles: vec![RoleConfig::new("root", "admin")],
                },
                PrincipalConfig {
                    name: "flinkuser".to_string(),
                    password: "flinkpw".to_string(),
                    roles: vec![
                        RoleConfig::new("read", "admin"),
                        RoleConfig::new("readAnyDatabase", "admin"),
                    ],
                },
            ],
            report_status: true,
        }
    }
}

/// MongoDB connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    /// Database in which principals are defined
    pub database: String,
    pub connect_timeout_ms: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/?directConnection=true".to_string(),
            database: "admin".to_string(),
            connect_timeout_ms: 10_000,
        }
    }
}

/// A principal to create when absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PrincipalConfig {
    pub name: String,
    pub password: String,
    pub roles: Vec<RoleConfig>,
}

/// Role granted on a database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleConfig {
    pub role: String,
    pub db: String,
}

impl RoleConfig {
    pub fn new(role: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            db: db.into(),
        }
    }
}

impl SeederConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    pub fn principal(&self, name: &str) -> Option<&PrincipalConfig> {
        self.principals.iter().find(|p| p.name == name)
    }

    /// Check the invariants the seeder relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mongodb.uri.trim().is_empty() {
            return Err(ConfigError::ValidationError("mongodb.uri must not be empty".into()));
        }
        if self.mongodb.database.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "mongodb.database must not be empty".into(),
            ));
        }
        if self.principals.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one principal must be configured".into(),
            ));
        }

        let mut seen = HashSet::new();
        let mut env_keys: HashMap<String, &str> = HashMap::new();
        for principal in &self.principals {
            if principal.name.trim().is_empty() {
                return Err(ConfigError::ValidationError("principal name must not be empty".into()));
            }
            if !seen.insert(principal.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "principal '{}' is configured more than once",
                    principal.name
                )));
            }
            let env_key = env_key_for_principal(&principal.name);
            if let Some(other) = env_keys.insert(env_key.clone(), principal.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "principals '{}' and '{}' share the password override {}",
                    other, principal.name, env_key
                )));
            }
            if principal.password.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "principal '{}' has an empty password",
                    principal.name
                )));
            }
            if principal.roles.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "principal '{}' has no roles",
                    principal.name
                )));
            }
            if let Some(role) = principal
                .roles
                .iter()
                .find(|r| r.role.trim().is_empty() || r.db.trim().is_empty())
            {
                return Err(ConfigError::ValidationError(format!(
                    "principal '{}' has an incomplete role grant (role='{}', db='{}')",
                    principal.name, role.role, role.db
                )));
            }
        }

        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Fixture Seeder Configuration
# Environment variables override these settings:
#   FIXTURE_SEEDER_MONGODB_URI, FIXTURE_SEEDER_MONGODB_DATABASE,
#   FIXTURE_SEEDER_CONNECT_TIMEOUT_MS, FIXTURE_SEEDER_REPORT_STATUS,
#   FIXTURE_SEEDER_<PRINCIPAL>_PASSWORD (e.g. FIXTURE_SEEDER_SUPERUSER_PASSWORD)

report_status = true

[mongodb]
uri = "mongodb://localhost:27017/?directConnection=true"
database = "admin"
connect_timeout_ms = 10000

# Principals are ensured in the order listed. Existing principals are left untouched.

[[principals]]
name = "superuser"
password = "superpw"
roles = [{ role = "root", db = "admin" }]

[[principals]]
name = "flinkuser"
password = "flinkpw"
roles = [
    { role = "read", db = "admin" },
    { role = "readAnyDatabase", db = "admin" },
]
"#
        .to_string()
    }
}
