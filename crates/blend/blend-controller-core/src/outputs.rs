//! Output contracts from the controller.
//!
//! Each tick publishes one [`TrackSample`] per loaded track (what the playback
//! engine composites) and the semantic events raised since the previous tick.

use serde::{Deserialize, Serialize};

use crate::ids::{Generation, TrackId};
use crate::registry::TrackGroup;
use crate::state::ActiveBase;

/// Per-track state published by a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub track: TrackId,
    pub name: String,
    pub group: TrackGroup,
    pub enabled: bool,
    pub weight: f32,
    pub time_scale: f32,
    pub local_time: f32,
    pub loop_count: u32,
}

/// Discrete signals raised by operations and ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BlendEvent {
    ModelLoaded {
        generation: Generation,
        bound: usize,
    },
    BaseTrackChanged {
        from: ActiveBase,
        to: ActiveBase,
    },
    TransitionDeferred {
        from: String,
        to: Option<String>,
        duration: f32,
    },
    TransitionStarted {
        from: Option<String>,
        to: Option<String>,
        duration: f32,
    },
    /// Pending transition withdrawn because its source was re-selected.
    TransitionCancelled {
        from: String,
    },
    /// A track crossed `loop_delta` loop boundaries during one tick.
    Loop {
        track: String,
        loop_delta: u32,
    },
    /// A weight fade completed; `enabled` is false when it faded out.
    FadeFinished {
        track: String,
        enabled: bool,
    },
}

/// Outputs returned by `BlendController::tick`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub samples: Vec<TrackSample>,
    #[serde(default)]
    pub events: Vec<BlendEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.samples.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_sample(&mut self, sample: TrackSample) {
        self.samples.push(sample);
    }

    #[inline]
    pub fn push_event(&mut self, event: BlendEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.events.is_empty()
    }

    pub fn sample(&self, name: &str) -> Option<&TrackSample> {
        self.samples.iter().find(|s| s.name == name)
    }
}

/// One control-panel row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub name: String,
    pub group: TrackGroup,
    pub weight: f32,
    /// Base row matching the active base track.
    pub active: bool,
}

/// Snapshot a control panel renders from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub current_base: ActiveBase,
    pub rows: Vec<PanelRow>,
}

impl PanelState {
    pub fn row(&self, name: &str) -> Option<&PanelRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}
