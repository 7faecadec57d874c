//! Queue engine configuration
//!
//! The engine itself takes a single knob, the queue capacity. Loading from
//! a TOML fragment is provided for the daemon's configuration file; the
//! compiled default applies when the key is absent.

use crate::{Error, Result};
use serde::Deserialize;

/// Default queue capacity when none is configured
pub const DEFAULT_MAX_LENGTH: usize = 16384;

/// Play queue configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Maximum number of songs the queue can hold
    pub max_length: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl QueueConfig {
    /// Parse a configuration from a TOML fragment
    ///
    /// # Examples
    ///
    /// ```
    /// use cadence_queue::config::QueueConfig;
    ///
    /// let config = QueueConfig::from_toml_str("max_length = 1024").unwrap();
    /// assert_eq!(config.max_length, 1024);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: QueueConfig = toml::from_str(text)
            .map_err(|e| Error::Config(format!("invalid queue configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check configured values for consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(Error::Config(
                "max_length must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
