//! Error types for the blend controller.
//!
//! Only the configuration and loading boundaries are fallible. Runtime
//! operations (transition requests, weight changes, ticks) degrade to
//! "state unchanged" and report through `log` instead.

use serde::{Deserialize, Serialize};

/// Errors raised while building a registry or loading clips.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BlendError {
    /// A track name appears more than once in the registry definition
    #[error("Track '{name}' is registered more than once")]
    DuplicateTrack { name: String },

    /// A registry default weight is outside [0, 1] or not finite
    #[error("Default weight {weight} for track '{name}' is outside [0, 1]")]
    InvalidWeight { name: String, weight: f32 },

    /// A clip supplied by the loader has a non-positive or non-finite duration
    #[error("Clip '{name}' has invalid duration {duration}")]
    InvalidClipDuration { name: String, duration: f32 },

    /// The loader supplied the same clip name twice
    #[error("Clip '{name}' was supplied more than once")]
    DuplicateClip { name: String },

    /// Configuration is structurally invalid
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON (de)serialization failed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl BlendError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::DuplicateTrack { .. } | Self::InvalidWeight { .. } | Self::InvalidConfig { .. } => {
                "config"
            }
            Self::InvalidClipDuration { .. } | Self::DuplicateClip { .. } => "load",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for BlendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
