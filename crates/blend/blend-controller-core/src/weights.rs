//! Weight normalizer.
//!
//! `set_weight` is the only way a disabled handle becomes enabled again. It also
//! resets the time scale to 1 and cancels any running fade or warp: a finished
//! warped crossfade leaves the outgoing clip at the warped speed, so every
//! re-activation must restore the clip's native speed.

use crate::action::ActionHandle;

/// Enable `handle` at native speed with `weight` as both target and effective weight.
///
/// Callers clamp `weight` to [0, 1]; nothing is validated here.
#[inline]
pub fn set_weight(handle: &mut ActionHandle, weight: f32) {
    handle.enabled = true;

    handle.time_scale = 1.0;
    handle.effective_time_scale = 1.0;
    handle.warp = None;

    handle.weight = weight;
    handle.effective_weight = weight;
    handle.fade = None;
}
