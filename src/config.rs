//! Runtime configuration.
//!
//! Everything has a default, so a config file is optional. When given, it is
//! YAML and may set any subset of the keys:
//!
//! ```yaml
//! query_endpoint: http://export.arxiv.org/api/query
//! oai_endpoint: http://export.arxiv.org/oai2
//! abs_url_base: http://www.arxiv.org/abs/
//! archive_set: cs
//! categories: [cs.cl, cs.ai]
//! max_attempts: 5
//! default_retry_after_secs: 30
//! request_timeout_secs: 60
//! ```

use crate::api::RetryPolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Categories searched by default: the computer-science subjects of interest.
pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "cs.cl", "cs.ai", "cs.ro", "cs.cv", "cs.gt", "cs.ne", "cs.hc", "cs.cy", "cs.lg", "cs.ir", "cs.se", "cs.ma",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Atom query API used for abstract lookups.
    pub query_endpoint: String,
    /// OAI-PMH endpoint used to list records.
    pub oai_endpoint: String,
    /// Prefix of canonical abstract-page URLs; the article id is appended.
    pub abs_url_base: String,
    /// OAI set to harvest.
    pub archive_set: String,
    pub categories: Vec<String>,
    /// Total requests per fetch, first one included.
    pub max_attempts: usize,
    /// Wait after a 503 that carries no usable `Retry-After`.
    pub default_retry_after_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_endpoint: "http://export.arxiv.org/api/query".to_string(),
            oai_endpoint: "http://export.arxiv.org/oai2".to_string(),
            abs_url_base: "http://www.arxiv.org/abs/".to_string(),
            archive_set: "cs".to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            max_attempts: 5,
            default_retry_after_secs: 30,
            request_timeout_secs: 60,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml(&yaml)?;
        info!(config_path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.query_url()?;
        self.oai_url()?;
        if self.abs_url_base.trim().is_empty() {
            return Err(Error::Config("abs_url_base must not be empty".into()));
        }
        Ok(())
    }

    pub fn query_url(&self) -> Result<Url> {
        Url::parse(&self.query_endpoint).map_err(|e| Error::Config(format!("query_endpoint: {e}")))
    }

    pub fn oai_url(&self) -> Result<Url> {
        Url::parse(&self.oai_endpoint).map_err(|e| Error::Config(format!("oai_endpoint: {e}")))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            default_wait: Duration::from_secs(self.default_retry_after_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
