//! Action handles: one schedulable instance of a loaded clip.
//!
//! A handle owns its playback position plus two optional ramps evaluated against
//! the controller clock: a weight fade and a time-scale warp. The effective weight
//! is `weight * fade` while enabled and `0` otherwise; a fade that lands on zero
//! disables the handle.

use serde::{Deserialize, Serialize};

use crate::ids::{Generation, TrackId};
use crate::registry::TrackGroup;

/// Linear interpolant over controller time `[start, start + duration]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub start: f64,
    pub duration: f32,
    pub from: f32,
    pub to: f32,
}

impl Ramp {
    pub fn new(start: f64, duration: f32, from: f32, to: f32) -> Self {
        Self {
            start,
            duration: duration.max(0.0),
            from,
            to,
        }
    }

    /// Value at `time`, held at `from` before the span and at `to` after it.
    pub fn evaluate(&self, time: f64) -> f32 {
        if self.is_finished(time) {
            return self.to;
        }
        if self.duration <= 0.0 {
            return self.from;
        }
        let elapsed = (time - self.start).max(0.0) as f32;
        let t = (elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    #[inline]
    pub fn is_finished(&self, time: f64) -> bool {
        time - self.start >= f64::from(self.duration)
    }
}

/// Runtime state of one loaded clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionHandle {
    pub track: TrackId,
    pub generation: Generation,
    /// Native clip length in seconds (always > 0).
    pub clip_duration: f32,
    pub enabled: bool,
    /// Configured time scale; a finished warp writes its final value here.
    pub time_scale: f32,
    /// Time scale applied during the last tick (warp included).
    pub effective_time_scale: f32,
    /// Configured weight; fades multiply it.
    pub weight: f32,
    pub effective_weight: f32,
    pub local_time: f32,
    pub loop_count: u32,
    pub fade: Option<Ramp>,
    pub warp: Option<Ramp>,
}

impl ActionHandle {
    pub fn new(track: TrackId, generation: Generation, clip_duration: f32) -> Self {
        Self {
            track,
            generation,
            clip_duration,
            enabled: true,
            time_scale: 1.0,
            effective_time_scale: 1.0,
            weight: 1.0,
            effective_weight: 1.0,
            local_time: 0.0,
            loop_count: 0,
            fade: None,
            warp: None,
        }
    }

    /// Current fade multiplier (1 when no fade is active).
    #[inline]
    pub fn fade_value(&self, time: f64) -> f32 {
        self.fade.map_or(1.0, |f| f.evaluate(time))
    }

    #[inline]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub(crate) fn schedule_fade(&mut self, now: f64, duration: f32, from: f32, to: f32) {
        self.fade = Some(Ramp::new(now, duration, from, to));
    }

    /// Warp between two absolute time scales. Values are stored relative to the
    /// configured `time_scale` so the ramp multiplies it.
    pub(crate) fn schedule_warp(&mut self, now: f64, duration: f32, start_scale: f32, end_scale: f32) {
        if self.time_scale == 0.0 {
            return;
        }
        let ts = self.time_scale;
        self.warp = Some(Ramp::new(now, duration, start_scale / ts, end_scale / ts));
    }

    /// Evaluate the warp at `time` and return the time scale for this tick.
    pub(crate) fn update_time_scale(&mut self, time: f64) -> f32 {
        let mut scale = self.time_scale;
        if let Some(warp) = self.warp {
            scale *= warp.evaluate(time);
            if warp.is_finished(time) {
                self.warp = None;
                self.time_scale = scale;
            }
        }
        self.effective_time_scale = scale;
        scale
    }

    /// Advance local time by `delta` clip seconds, wrapping on the clip length.
    /// Returns the number of loop boundaries crossed.
    pub(crate) fn advance(&mut self, delta: f32) -> u32 {
        if self.clip_duration <= 0.0 || delta <= 0.0 {
            return 0;
        }
        let time = self.local_time + delta;
        if time < self.clip_duration {
            self.local_time = time;
            return 0;
        }
        let cycles = (time / self.clip_duration).floor();
        let mut wrapped = time - cycles * self.clip_duration;
        if !(0.0..self.clip_duration).contains(&wrapped) {
            wrapped = 0.0;
        }
        self.local_time = wrapped;
        let loops = (cycles as u32).max(1);
        self.loop_count = self.loop_count.saturating_add(loops);
        loops
    }

    /// Evaluate the fade at `time` and refresh `effective_weight`.
    /// Returns the final fade value when a fade completed during this call.
    pub(crate) fn update_weight(&mut self, time: f64) -> Option<f32> {
        let mut weight = 0.0;
        let mut finished = None;
        if self.enabled {
            weight = self.weight;
            if let Some(fade) = self.fade {
                let value = fade.evaluate(time);
                weight *= value;
                if fade.is_finished(time) {
                    self.fade = None;
                    if value <= 0.0 {
                        self.enabled = false;
                    }
                    finished = Some(value);
                }
            }
        }
        self.effective_weight = weight;
        finished
    }
}

/// Registry entry bound to its (optional) runtime handle.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackEntry {
    pub name: String,
    pub group: TrackGroup,
    /// Last published effective weight; starts at the registry default.
    pub weight: f32,
    /// `None` until clips are loaded.
    pub action: Option<ActionHandle>,
}
