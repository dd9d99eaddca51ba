//! Blend state: which base track is active and what transition is waiting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::TrackId;

/// Base track whose crossfades start immediately instead of waiting for a loop boundary.
pub const IDLE_TRACK: &str = "idle";

/// The active base track, or none after a fade to nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ActiveBase {
    Track(String),
    None,
}

impl ActiveBase {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(n) => Self::Track(n.to_string()),
            None => Self::None,
        }
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Track(n) => Some(n.as_str()),
            Self::None => None,
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.name() == Some(IDLE_TRACK)
    }

    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name() == Some(name)
    }
}

impl fmt::Display for ActiveBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("none"))
    }
}

/// A crossfade waiting for `from` to complete its current loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTransition {
    pub from: TrackId,
    /// `None` fades `from` out to nothing.
    pub to: Option<TrackId>,
    pub duration: f32,
    pub awaiting_loop_boundary: bool,
}

/// Mutable controller state for the lifetime of one loaded model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendState {
    pub current_base: ActiveBase,
    /// Mixer-wide speed multiplier (> 0).
    pub global_time_scale: f32,
    pub pending: Option<PendingTransition>,
    /// Controller clock: accumulated, globally scaled tick time.
    pub time: f64,
}

impl BlendState {
    pub fn new(current_base: ActiveBase, global_time_scale: f32) -> Self {
        Self {
            current_base,
            global_time_scale,
            pending: None,
            time: 0.0,
        }
    }
}
