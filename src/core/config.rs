use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct RecordStoreConfig {
    pub base_url: String,
    #[serde(default = "RecordStoreConfig::default_bucket")]
    pub bucket: String,
    #[serde(default = "RecordStoreConfig::default_region")]
    pub region: String,
    /// Requester-pays buckets only answer signed requests. Without keys here
    /// the AWS_* environment variables are tried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

impl RecordStoreConfig {
    fn default_bucket() -> String {
        "chaindata-digibyte".to_string()
    }

    fn default_region() -> String {
        crate::providers::blob_store::DEFAULT_REGION.to_string()
    }

    /// Explicit key pair, if configured. Setting only one half is an error.
    pub fn credentials(&self) -> Result<Option<(&str, &str)>> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Ok(Some((id.as_str(), secret.as_str()))),
            (None, None) => Ok(None),
            _ => bail!("record_store needs both access_key_id and secret_access_key"),
        }
    }
}

impl std::fmt::Debug for RecordStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStoreConfig")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VoteStoreConfig {
    pub api_url: String,
    #[serde(default = "VoteStoreConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl VoteStoreConfig {
    fn default_timeout_ms() -> u64 {
        10_000
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for VoteStoreConfig {
    fn default() -> Self {
        VoteStoreConfig {
            api_url: crate::providers::ipfs_votes::DEFAULT_IPFS_API.to_string(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct HeightConfig {
    pub url: Option<String>,
    pub fallback: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Lookups fail with "not initialized" until this is set.
    pub record_store: Option<RecordStoreConfig>,
    #[serde(default)]
    pub vote_store: VoteStoreConfig,
    #[serde(default)]
    pub height: HeightConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "digibyte", "chaindata")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
