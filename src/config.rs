//! Configuration for lightwire
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

use crate::command::FadeEffect;
use crate::error::{LightError, Result};

/// Default TCP port of the control protocol
pub const DEFAULT_PORT: u16 = 55443;

/// Client configuration for one light
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP port of the device
    pub port: u16,

    /// TCP handshake timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// How long to wait for one response line (milliseconds).
    /// A job that gets no line within this window counts as silently accepted.
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Command Configuration
    // -------------------------------------------------------------------------
    /// How the per-job outcomes of a commit fold into one boolean
    pub commit_policy: CommitPolicy,

    /// Fade effect used by the helpers that do not take one explicitly
    pub default_effect: FadeEffect,
}

/// Aggregation policy for [`crate::queue::CommitReport::succeeded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// The commit succeeded if at least one job did
    #[default]
    AnySucceeded,

    /// The commit succeeded only if the batch was non-empty and every job did
    AllSucceeded,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            read_timeout_ms: 2000,
            write_timeout_ms: 5000,
            commit_policy: CommitPolicy::AnySucceeded,
            default_effect: FadeEffect::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the socket layer cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(LightError::Config("connect_timeout_ms must be > 0".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(LightError::Config("read_timeout_ms must be > 0".to_string()));
        }
        if self.write_timeout_ms == 0 {
            return Err(LightError::Config("write_timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the device port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the response read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the commit aggregation policy
    pub fn commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.config.commit_policy = policy;
        self
    }

    /// Set the fade effect used by the convenience helpers
    pub fn default_effect(mut self, effect: FadeEffect) -> Self {
        self.config.default_effect = effect;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
