//! Configuration for reindex runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::Endpoint;
use crate::error::{ReindexError, Result};

/// Default page and write-buffer size.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Process-wide defaults owned by a [`Reindexer`](crate::reindex::Reindexer).
///
/// A run takes a snapshot of this configuration when it starts; changing it
/// afterwards only affects later runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReindexConfig {
    /// Documents per page on read and per buffer on write.
    pub page_size: usize,

    /// Whether to commit on the write target at the end of a run.
    pub commit: bool,

    /// Endpoint to read from. `None` uses the client's default.
    pub read_endpoint: Option<Endpoint>,

    /// Endpoint to write to. `None` uses the client's default.
    pub write_endpoint: Option<Endpoint>,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        ReindexConfig {
            page_size: DEFAULT_PAGE_SIZE,
            commit: true,
            read_endpoint: None,
            write_endpoint: None,
        }
    }
}

impl ReindexConfig {
    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set whether runs commit.
    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    /// Set the read endpoint.
    pub fn with_read_endpoint<E: Into<Endpoint>>(mut self, endpoint: E) -> Self {
        self.read_endpoint = Some(endpoint.into());
        self
    }

    /// Set the write endpoint.
    pub fn with_write_endpoint<E: Into<Endpoint>>(mut self, endpoint: E) -> Self {
        self.write_endpoint = Some(endpoint.into());
        self
    }

    /// Check the configuration is usable for a run.
    pub fn validate(&self) -> Result<()> {
        validate_page_size(self.page_size)
    }

    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReindexConfig = serde_json::from_str(json)
            .map_err(|e| ReindexError::invalid_config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}

fn validate_page_size(page_size: usize) -> Result<()> {
    if page_size < 1 {
        return Err(ReindexError::invalid_config(format!(
            "page size must be at least 1, got {page_size}"
        )));
    }
    Ok(())
}

/// Per-call overrides of the [`ReindexConfig`] defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Page and buffer size for this run.
    pub page_size: Option<usize>,

    /// Endpoint to read from for this run.
    pub read_endpoint: Option<Endpoint>,

    /// Endpoint to write to for this run.
    pub write_endpoint: Option<Endpoint>,

    /// Whether this run commits.
    pub commit: Option<bool>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_from<E: Into<Endpoint>>(mut self, endpoint: E) -> Self {
        self.read_endpoint = Some(endpoint.into());
        self
    }

    pub fn write_to<E: Into<Endpoint>>(mut self, endpoint: E) -> Self {
        self.write_endpoint = Some(endpoint.into());
        self
    }

    pub fn commit(mut self, commit: bool) -> Self {
        self.commit = Some(commit);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Effective settings of a single run.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunSettings {
    pub page_size: usize,
    pub commit: bool,
    pub read_endpoint: Option<Endpoint>,
    pub write_endpoint: Option<Endpoint>,
}

impl RunSettings {
    /// Resolve the settings of a run, options taking precedence over config.
    /// Only the resolved page size is validated.
    pub fn resolve(config: &ReindexConfig, options: &RunOptions) -> Result<Self> {
        let page_size = options.page_size.unwrap_or(config.page_size);
        validate_page_size(page_size)?;
        Ok(RunSettings {
            page_size,
            commit: options.commit.unwrap_or(config.commit),
            read_endpoint: options
                .read_endpoint
                .clone()
                .or_else(|| config.read_endpoint.clone()),
            write_endpoint: options
                .write_endpoint
                .clone()
                .or_else(|| config.write_endpoint.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReindexConfig::default();
        assert_eq!(config.page_size, 200);
        assert!(config.commit);
        assert!(config.read_endpoint.is_none());
        assert!(config.write_endpoint.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_is_invalid() {
        let config = ReindexConfig::default().with_page_size(0);
        assert!(matches!(
            config.validate(),
            Err(ReindexError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{"page_size": 50, "write_endpoint": "replica"}"#;
        let config = ReindexConfig::from_json_str(json).unwrap();
        assert_eq!(config.page_size, 50);
        assert!(config.commit);
        assert_eq!(config.write_endpoint, Some(Endpoint::from("replica")));

        assert!(ReindexConfig::from_json_str(r#"{"page_size": 0}"#).is_err());
        assert!(ReindexConfig::from_json_str("{").is_err());
    }

    #[test]
    fn test_options_override_config() {
        let config = ReindexConfig::default()
            .with_read_endpoint("a")
            .with_write_endpoint("b");
        let options = RunOptions::new().write_to("c").commit(false);

        let settings = RunSettings::resolve(&config, &options).unwrap();
        assert_eq!(settings.read_endpoint, Some(Endpoint::from("a")));
        assert_eq!(settings.write_endpoint, Some(Endpoint::from("c")));
        assert!(!settings.commit);
        assert_eq!(settings.page_size, 200);
    }

    #[test]
    fn test_page_size_override() {
        let config = ReindexConfig::default().with_page_size(0);

        let settings = RunSettings::resolve(&config, &RunOptions::new().page_size(25)).unwrap();
        assert_eq!(settings.page_size, 25);

        assert!(RunSettings::resolve(&config, &RunOptions::new()).is_err());
        assert!(matches!(
            RunSettings::resolve(&ReindexConfig::default(), &RunOptions::new().page_size(0)),
            Err(ReindexError::InvalidConfiguration(_))
        ));
    }
}
