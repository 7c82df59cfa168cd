//! Configuration loading and validation for the demo.
//!
//! All values are read from environment variables at startup.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use encrypted_column::MasterKey;
use serde::Deserialize;

/// Validated demo configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// sqlx connection string.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Access token forwarded to the encryption service. When set, the local
    /// client also requires it.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Base64-encoded 32-byte master key for the local client. A random key is
    /// generated when absent.
    #[serde(default)]
    pub master_key: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_url() -> String {
    "sqlite::memory:".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The local client's master key: decoded from `MASTER_KEY`, or random.
    ///
    /// # Errors
    ///
    /// Returns an error if `MASTER_KEY` is not base64 of exactly 32 bytes.
    pub fn master_key(&self) -> Result<MasterKey> {
        match &self.master_key {
            Some(encoded) => {
                let bytes = STANDARD
                    .decode(encoded.trim())
                    .context("MASTER_KEY must be base64")?;
                MasterKey::from_bytes(&bytes).context("MASTER_KEY has the wrong length")
            }
            None => Ok(MasterKey::random()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }
        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!("DATABASE_URL must be a sqlite: URL");
        }
        if matches!(&self.access_token, Some(t) if t.trim().is_empty()) {
            anyhow::bail!("ACCESS_TOKEN must not be blank when set");
        }
        self.master_key()?;
        Ok(())
    }
}
