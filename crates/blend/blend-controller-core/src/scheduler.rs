//! Crossfade scheduler.
//!
//! Decides whether a base-track request runs now or waits for the outgoing
//! track's next loop boundary, and configures the weight fades and time warps
//! of a crossfade once it runs.

use serde::{Deserialize, Serialize};

use crate::action::TrackEntry;
use crate::ids::TrackId;
use crate::outputs::BlendEvent;
use crate::registry::{ClipRegistry, TrackGroup};
use crate::state::{ActiveBase, BlendState, PendingTransition, IDLE_TRACK};
use crate::weights::set_weight;

/// What a transition request did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Crossfade started in this call.
    Immediate,
    /// Crossfade waits for the outgoing track's next loop boundary.
    Deferred,
    /// A waiting crossfade received a new target and duration.
    PendingReplaced,
    /// The waiting crossfade was withdrawn; its source stays active.
    PendingCancelled,
    /// Target is already the current base track.
    AlreadyActive,
    /// Target is not a registered base track.
    UnknownTrack,
    /// Target is registered but the loaded model has no clip for it.
    MissingClip,
    /// No clips are loaded yet.
    NotReady,
}

impl RequestOutcome {
    /// Whether the request changed the current base track.
    #[inline]
    pub fn changed_base(self) -> bool {
        matches!(
            self,
            Self::Immediate | Self::Deferred | Self::PendingReplaced | Self::PendingCancelled
        )
    }
}

fn has_handle(entries: &[TrackEntry], id: TrackId) -> bool {
    entries
        .get(id.index())
        .map_or(false, |e| e.action.is_some())
}

fn name_of(entries: &[TrackEntry], id: Option<TrackId>) -> Option<String> {
    id.and_then(|id| entries.get(id.index())).map(|e| e.name.clone())
}

fn clip_duration(entries: &[TrackEntry], id: Option<TrackId>) -> Option<f32> {
    id.and_then(|id| entries.get(id.index()))
        .and_then(|e| e.action.as_ref())
        .map(|h| h.clip_duration)
}

fn set_current_base(state: &mut BlendState, to: ActiveBase, events: &mut Vec<BlendEvent>) {
    let from = std::mem::replace(&mut state.current_base, to.clone());
    log::info!("base track: {from} -> {to}");
    events.push(BlendEvent::BaseTrackChanged { from, to });
}

/// Route a base-track request to the immediate or deferred path.
///
/// `target = None` fades the current base track out to nothing. The caller
/// guarantees that clips are loaded.
pub(crate) fn request_transition(
    registry: &ClipRegistry,
    entries: &mut [TrackEntry],
    state: &mut BlendState,
    target: Option<&str>,
    duration: f32,
    events: &mut Vec<BlendEvent>,
) -> RequestOutcome {
    let duration = if duration.is_finite() {
        duration.max(0.0)
    } else {
        0.0
    };

    // 1) Resolve the incoming track
    let end = match target {
        Some(name) => match registry.get_by_name(name) {
            Some((id, entry)) if entry.group == TrackGroup::Base => Some(id),
            Some(_) => {
                log::debug!("ignoring transition to additive track '{name}'");
                return RequestOutcome::UnknownTrack;
            }
            None => {
                log::debug!("ignoring transition to unknown track '{name}'");
                return RequestOutcome::UnknownTrack;
            }
        },
        None => None,
    };

    if state.current_base.name() == target {
        return RequestOutcome::AlreadyActive;
    }

    if let Some(id) = end {
        if !has_handle(entries, id) {
            log::debug!(
                "ignoring transition to '{}': no clip loaded",
                target.unwrap_or_default()
            );
            return RequestOutcome::MissingClip;
        }
    }

    // 2) Resolve the outgoing track. A waiting crossfade has not started, so its
    // source is still the track that is visibly playing.
    let pending_from = state.pending.as_ref().map(|p| p.from);
    let start = match pending_from {
        Some(from) => Some(from),
        None => state
            .current_base
            .name()
            .and_then(|n| registry.id_of(n))
            .filter(|&id| has_handle(entries, id)),
    };

    if let (Some(from), Some(to)) = (pending_from, end) {
        if from == to {
            state.pending = None;
            let from_name = name_of(entries, Some(from)).unwrap_or_default();
            log::debug!("cancelled deferred transition away from '{from_name}'");
            events.push(BlendEvent::TransitionCancelled {
                from: from_name.clone(),
            });
            set_current_base(state, ActiveBase::Track(from_name), events);
            return RequestOutcome::PendingCancelled;
        }
    }

    let start_name = name_of(entries, start);
    let immediate = start_name.as_deref() == Some(IDLE_TRACK) || start.is_none() || end.is_none();

    set_current_base(state, ActiveBase::from_name(target), events);

    match start {
        Some(from) if !immediate => {
            let replaced = state
                .pending
                .replace(PendingTransition {
                    from,
                    to: end,
                    duration,
                    awaiting_loop_boundary: true,
                })
                .is_some();
            events.push(BlendEvent::TransitionDeferred {
                from: start_name.unwrap_or_default(),
                to: target.map(str::to_string),
                duration,
            });
            if replaced {
                RequestOutcome::PendingReplaced
            } else {
                RequestOutcome::Deferred
            }
        }
        _ => {
            if state.pending.take().is_some() {
                log::debug!("deferred transition superseded by an immediate one");
            }
            execute(entries, start, end, duration, state.time, events);
            RequestOutcome::Immediate
        }
    }
}

/// Start a crossfade between two base tracks at controller time `now`.
///
/// Either side may be absent: no `start` fades `end` in, no `end` fades
/// `start` out.
pub(crate) fn execute(
    entries: &mut [TrackEntry],
    start: Option<TrackId>,
    end: Option<TrackId>,
    duration: f32,
    now: f64,
    events: &mut Vec<BlendEvent>,
) {
    let start_duration = clip_duration(entries, start);
    let end_duration = clip_duration(entries, end);
    let warp = match (start_duration, end_duration) {
        (Some(s), Some(e)) if s > 0.0 && e > 0.0 => Some((s, e)),
        _ => None,
    };

    if let Some(handle) = end
        .and_then(|id| entries.get_mut(id.index()))
        .and_then(|e| e.action.as_mut())
    {
        set_weight(handle, 1.0);
        handle.local_time = 0.0;
        handle.schedule_fade(now, duration, 0.0, 1.0);
        if let Some((s, e)) = warp {
            handle.schedule_warp(now, duration, e / s, 1.0);
        }
    }

    if let Some(handle) = start
        .and_then(|id| entries.get_mut(id.index()))
        .and_then(|e| e.action.as_mut())
    {
        if handle.enabled {
            let from = handle.fade_value(now);
            handle.schedule_fade(now, duration, from, 0.0);
            if let Some((s, e)) = warp {
                handle.schedule_warp(now, duration, 1.0, s / e);
            }
        }
    }

    let from = name_of(entries, start);
    let to = name_of(entries, end);
    log::debug!(
        "crossfade {} -> {} over {duration}s",
        from.as_deref().unwrap_or("none"),
        to.as_deref().unwrap_or("none")
    );
    events.push(BlendEvent::TransitionStarted { from, to, duration });
}
