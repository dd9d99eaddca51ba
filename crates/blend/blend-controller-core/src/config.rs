//! Controller configuration.

use serde::{Deserialize, Serialize};

use crate::error::BlendError;
use crate::registry::RegistryConfig;
use crate::Result;

fn default_global_time_scale() -> f32 {
    1.0
}

fn default_crossfade() -> f32 {
    0.35
}

fn default_max_events() -> usize {
    1024
}

/// Configuration for a [`BlendController`](crate::BlendController).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Track catalog (base and additive groups).
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Initial mixer-wide time scale, restored on every model load.
    #[serde(default = "default_global_time_scale")]
    pub global_time_scale: f32,

    /// Crossfade length used when a command does not carry one.
    #[serde(default = "default_crossfade")]
    pub default_crossfade: f32,

    /// Maximum events kept per tick; extra events are dropped with a warning.
    #[serde(default = "default_max_events")]
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            global_time_scale: default_global_time_scale(),
            default_crossfade: default_crossfade(),
            max_events_per_tick: default_max_events(),
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check scalar settings. Registry contents are validated when the registry is built.
    pub fn validate(&self) -> Result<()> {
        if !self.global_time_scale.is_finite() || self.global_time_scale <= 0.0 {
            return Err(BlendError::InvalidConfig {
                reason: format!(
                    "global_time_scale must be > 0, got {}",
                    self.global_time_scale
                ),
            });
        }
        if !self.default_crossfade.is_finite() || self.default_crossfade < 0.0 {
            return Err(BlendError::InvalidConfig {
                reason: format!(
                    "default_crossfade must be >= 0, got {}",
                    self.default_crossfade
                ),
            });
        }
        Ok(())
    }
}
