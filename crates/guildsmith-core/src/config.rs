//! Guildsmith configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! [confirmation]
//! timeout_secs = 30
//!
//! [teardown]
//! exempt_channel = "geral"
//! max_concurrent_deletions = 32
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildsmithConfig {
    /// Confirmation gate settings
    pub confirmation: ConfirmationConfig,
    /// Teardown executor settings
    pub teardown: TeardownConfig,
    /// Verification gateway settings
    pub gateway: GatewayConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

impl GuildsmithConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "confirmation.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.teardown.max_concurrent_deletions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "teardown.max_concurrent_deletions",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.teardown.exempt_channel.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "teardown.exempt_channel",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// With confirmation timeout
    #[inline]
    #[must_use]
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation.timeout_secs = timeout.as_secs();
        self
    }

    /// With teardown concurrency bound
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_deletions(mut self, max: usize) -> Self {
        self.teardown.max_concurrent_deletions = max;
        self
    }

    /// With exempt channel name
    #[inline]
    #[must_use]
    pub fn with_exempt_channel(mut self, name: impl Into<String>) -> Self {
        self.teardown.exempt_channel = name.into();
        self
    }
}

/// Confirmation gate settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Seconds the operator has to decide
    pub timeout_secs: u64,
}

impl ConfirmationConfig {
    /// Deadline as a duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Teardown executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeardownConfig {
    /// Channel retained by name
    pub exempt_channel: String,
    /// Upper bound on in-flight deletions
    pub max_concurrent_deletions: usize,
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self {
            exempt_channel: "geral".to_string(),
            max_concurrent_deletions: 32,
        }
    }
}

/// Verification gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Name of the public verification channel
    pub channel_name: String,
    /// Role granted on activation
    pub baseline_role: String,
    /// Upper bound on game picks in the preference menu
    pub max_game_choices: u8,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            channel_name: "✅-verificacao".to_string(),
            baseline_role: "Verificado".to_string(),
            max_game_choices: 5,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
