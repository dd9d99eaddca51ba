//! Controller: owns the registry, per-track handles and blend state, and steps them once per frame.
//!
//! Methods:
//! - new, load_clips, request_transition, set_additive_weight, set_global_time_scale
//! - tick (warp/advance → deferred fire → fade/weights → samples), update (commands → tick)

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::action::{ActionHandle, TrackEntry};
use crate::config::Config;
use crate::error::BlendError;
use crate::ids::{Generation, GenerationCounter};
use crate::inputs::{BlendCommand, Inputs};
use crate::outputs::{BlendEvent, Outputs, PanelRow, PanelState, TrackSample};
use crate::registry::{ClipRegistry, TrackGroup};
use crate::scheduler::{self, RequestOutcome};
use crate::state::{ActiveBase, BlendState, PendingTransition};
use crate::weights::set_weight;
use crate::Result;

/// A clip as reported by the model loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name: String,
    /// Clip length in seconds.
    pub duration: f32,
}

impl ClipInfo {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Result of binding a loaded model's clips to the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub generation: Generation,
    /// Registered clips that received a handle, in load order.
    pub bound: Vec<String>,
    /// Clips the registry does not know.
    pub skipped: Vec<String>,
    /// Registered tracks the model has no clip for.
    pub missing: Vec<String>,
}

fn fresh_entries(registry: &ClipRegistry) -> Vec<TrackEntry> {
    registry
        .entries()
        .iter()
        .map(|e| TrackEntry {
            name: e.name.clone(),
            group: e.group,
            weight: e.weight,
            action: None,
        })
        .collect()
}

fn initial_base(registry: &ClipRegistry) -> ActiveBase {
    ActiveBase::from_name(registry.default_base().map(|e| e.name.as_str()))
}

/// Crossfade and additive-weight controller for one character.
#[derive(Debug)]
pub struct BlendController {
    cfg: Config,
    registry: ClipRegistry,
    entries: Vec<TrackEntry>,
    state: BlendState,
    generations: GenerationCounter,
    loaded: Option<Generation>,
    /// Events raised by operations between ticks.
    queued: Vec<BlendEvent>,
    outputs: Outputs,
}

impl Default for BlendController {
    fn default() -> Self {
        let cfg = Config::default();
        let registry = ClipRegistry::default();
        let state = BlendState::new(initial_base(&registry), cfg.global_time_scale);
        Self {
            entries: fresh_entries(&registry),
            cfg,
            registry,
            state,
            generations: GenerationCounter::new(),
            loaded: None,
            queued: Vec::new(),
            outputs: Outputs::default(),
        }
    }
}

impl BlendController {
    pub fn new(cfg: Config) -> Result<Self> {
        cfg.validate()?;
        let registry = ClipRegistry::from_config(&cfg.registry)?;
        let state = BlendState::new(initial_base(&registry), cfg.global_time_scale);
        Ok(Self {
            entries: fresh_entries(&registry),
            cfg,
            registry,
            state,
            generations: GenerationCounter::new(),
            loaded: None,
            queued: Vec::new(),
            outputs: Outputs::default(),
        })
    }

    /// Bind a model's clips to the registry and activate every bound track at its default weight.
    ///
    /// Replaces the handles of any previous model and resets the blend state. On error the
    /// controller is left unchanged.
    pub fn load_clips(&mut self, clips: &[ClipInfo]) -> Result<LoadReport> {
        let mut seen = HashSet::with_capacity(clips.len());
        for clip in clips {
            if !clip.duration.is_finite() || clip.duration <= 0.0 {
                return Err(BlendError::InvalidClipDuration {
                    name: clip.name.clone(),
                    duration: clip.duration,
                });
            }
            if !seen.insert(clip.name.as_str()) {
                return Err(BlendError::DuplicateClip {
                    name: clip.name.clone(),
                });
            }
        }

        let generation = self.generations.alloc();
        let mut entries = fresh_entries(&self.registry);
        let mut bound = Vec::new();
        let mut skipped = Vec::new();

        for clip in clips {
            let Some(id) = self.registry.id_of(&clip.name) else {
                log::debug!("skipping unregistered clip '{}'", clip.name);
                skipped.push(clip.name.clone());
                continue;
            };
            let Some(entry) = entries.get_mut(id.index()) else {
                continue;
            };
            let mut handle = ActionHandle::new(id, generation, clip.duration);
            set_weight(&mut handle, entry.weight);
            entry.action = Some(handle);
            bound.push(clip.name.clone());
        }

        let missing: Vec<String> = entries
            .iter()
            .filter(|e| e.action.is_none())
            .map(|e| e.name.clone())
            .collect();
        if !missing.is_empty() {
            log::debug!("registered tracks without clips: {missing:?}");
        }

        self.entries = entries;
        self.state = BlendState::new(initial_base(&self.registry), self.cfg.global_time_scale);
        self.loaded = Some(generation);
        log::info!(
            "loaded model generation {}: {} bound, {} skipped",
            generation.0,
            bound.len(),
            skipped.len()
        );
        self.queued.push(BlendEvent::ModelLoaded {
            generation,
            bound: bound.len(),
        });

        Ok(LoadReport {
            generation,
            bound,
            skipped,
            missing,
        })
    }

    /// Crossfade to the base track `target`, or fade the current one out when `target` is `None`.
    ///
    /// Never fails: rejected requests leave the controller unchanged and say why in the outcome.
    pub fn request_transition(&mut self, target: Option<&str>, duration: f32) -> RequestOutcome {
        if self.loaded.is_none() {
            log::debug!("transition request before any clips were loaded");
            return RequestOutcome::NotReady;
        }
        scheduler::request_transition(
            &self.registry,
            &mut self.entries,
            &mut self.state,
            target,
            duration,
            &mut self.queued,
        )
    }

    /// Set an additive layer's weight, clamped to [0, 1]. Returns false when ignored.
    pub fn set_additive_weight(&mut self, name: &str, weight: f32) -> bool {
        if !weight.is_finite() {
            log::warn!("ignoring non-finite weight for '{name}'");
            return false;
        }
        let Some((id, reg)) = self.registry.get_by_name(name) else {
            log::debug!("ignoring weight for unknown track '{name}'");
            return false;
        };
        if reg.group != TrackGroup::Additive {
            log::debug!("ignoring weight for base track '{name}'");
            return false;
        }
        let Some(entry) = self.entries.get_mut(id.index()) else {
            return false;
        };
        let Some(handle) = entry.action.as_mut() else {
            log::debug!("no clip loaded for '{name}'");
            return false;
        };
        let weight = weight.clamp(0.0, 1.0);
        set_weight(handle, weight);
        entry.weight = weight;
        true
    }

    /// Set the mixer-wide speed multiplier. Returns false for non-positive or non-finite values.
    pub fn set_global_time_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!("ignoring global time scale {scale}");
            return false;
        }
        self.state.global_time_scale = scale;
        true
    }

    /// Step all handles by `dt` seconds of wall time.
    pub fn tick(&mut self, dt: f32) -> &Outputs {
        self.outputs.clear();

        // 1) Events raised by operations since the last tick
        self.outputs.events.append(&mut self.queued);

        // 2) Advance the controller clock
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let scaled = dt * self.state.global_time_scale;
        self.state.time += f64::from(scaled);
        let now = self.state.time;

        // 3) Warp and advance local time
        let waiting_on = self
            .state
            .pending
            .as_ref()
            .filter(|p| p.awaiting_loop_boundary)
            .map(|p| p.from);
        let mut boundary_reached = false;
        for entry in self.entries.iter_mut() {
            let Some(handle) = entry.action.as_mut() else {
                continue;
            };
            if !handle.enabled {
                continue;
            }
            let scale = handle.update_time_scale(now);
            let loops = handle.advance(scaled * scale);
            if loops > 0 {
                if waiting_on == Some(handle.track) {
                    boundary_reached = true;
                }
                self.outputs.push_event(BlendEvent::Loop {
                    track: entry.name.clone(),
                    loop_delta: loops,
                });
            }
        }

        // 4) Fire a deferred crossfade whose source just looped
        if boundary_reached {
            if let Some(pending) = self.state.pending.take() {
                scheduler::execute(
                    &mut self.entries,
                    Some(pending.from),
                    pending.to,
                    pending.duration,
                    now,
                    &mut self.outputs.events,
                );
            }
        }

        // 5) Fades and weights
        for entry in self.entries.iter_mut() {
            let Some(handle) = entry.action.as_mut() else {
                continue;
            };
            if handle.update_weight(now).is_some() {
                self.outputs.push_event(BlendEvent::FadeFinished {
                    track: entry.name.clone(),
                    enabled: handle.enabled,
                });
            }
            entry.weight = handle.effective_weight;
            self.outputs.push_sample(TrackSample {
                track: handle.track,
                name: entry.name.clone(),
                group: entry.group,
                enabled: handle.enabled,
                weight: handle.effective_weight,
                time_scale: handle.effective_time_scale,
                local_time: handle.local_time,
                loop_count: handle.loop_count,
            });
        }

        // 6) Backpressure
        let cap = self.cfg.max_events_per_tick;
        if self.outputs.events.len() > cap {
            let dropped = self.outputs.events.len() - cap;
            self.outputs.events.truncate(cap);
            log::warn!("dropped {dropped} events over the per-tick limit of {cap}");
        }

        &self.outputs
    }

    /// Apply a batch of commands in order, then tick.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        for cmd in inputs.commands {
            match cmd {
                BlendCommand::RequestTransition { target, duration } => {
                    let duration = duration.unwrap_or(self.cfg.default_crossfade);
                    self.request_transition(target.as_deref(), duration);
                }
                BlendCommand::SetAdditiveWeight { track, weight } => {
                    self.set_additive_weight(&track, weight);
                }
                BlendCommand::SetGlobalTimeScale { scale } => {
                    self.set_global_time_scale(scale);
                }
            }
        }
        self.tick(dt)
    }

    /// Snapshot for a control panel: one row per registered track.
    pub fn panel_state(&self) -> PanelState {
        let rows = self
            .entries
            .iter()
            .map(|e| PanelRow {
                name: e.name.clone(),
                group: e.group,
                weight: e.weight,
                active: e.group == TrackGroup::Base && self.state.current_base.is(&e.name),
            })
            .collect();
        PanelState {
            current_base: self.state.current_base.clone(),
            rows,
        }
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn current_base(&self) -> &ActiveBase {
        &self.state.current_base
    }

    pub fn pending_transition(&self) -> Option<&PendingTransition> {
        self.state.pending.as_ref()
    }

    pub fn action(&self, name: &str) -> Option<&ActionHandle> {
        self.entry(name).and_then(|e| e.action.as_ref())
    }

    pub fn entry(&self, name: &str) -> Option<&TrackEntry> {
        let id = self.registry.id_of(name)?;
        self.entries.get(id.index())
    }

    pub fn entries(&self) -> &[TrackEntry] {
        &self.entries
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn generation(&self) -> Option<Generation> {
        self.loaded
    }

    /// Controller clock in (globally scaled) seconds since the last load.
    pub fn time(&self) -> f64 {
        self.state.time
    }

    pub fn global_time_scale(&self) -> f32 {
        self.state.global_time_scale
    }

    pub fn state(&self) -> &BlendState {
        &self.state
    }

    pub fn registry(&self) -> &ClipRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
