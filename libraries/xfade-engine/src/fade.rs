//! Transition state and envelope math

use crate::channel::ChannelId;
use crate::curve::FadeCurve;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of transition in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FadeMode {
    /// No transition, channels hold their idle volumes
    #[default]
    None,

    /// One channel ramps up to target volume
    FadeIn,

    /// One channel ramps down while the other ramps up
    CrossFade,

    /// One channel ramps down to silence
    FadeOut,
}

/// Descriptor of the transition in flight
///
/// `mode == FadeMode::None` exactly when both channel references are unset;
/// every constructor and [`FadeState::clear`] keep that true.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FadeState {
    mode: FadeMode,
    elapsed: Duration,
    fade_out: Option<ChannelId>,
    fade_in: Option<ChannelId>,
    start_volume_out: f32,
    start_volume_in: f32,
}

impl FadeState {
    /// Ramp `channel` from `start_volume` up to target
    pub fn fade_in(channel: ChannelId, start_volume: f32) -> Self {
        Self {
            mode: FadeMode::FadeIn,
            elapsed: Duration::ZERO,
            fade_out: None,
            fade_in: Some(channel),
            start_volume_out: 0.0,
            start_volume_in: start_volume,
        }
    }

    /// Ramp `from` down and `to` up at the same time
    pub fn cross_fade(from: ChannelId, from_volume: f32, to: ChannelId, to_volume: f32) -> Self {
        Self {
            mode: FadeMode::CrossFade,
            elapsed: Duration::ZERO,
            fade_out: Some(from),
            fade_in: Some(to),
            start_volume_out: from_volume,
            start_volume_in: to_volume,
        }
    }

    /// Ramp `channel` down to silence
    pub fn fade_out(channel: ChannelId, start_volume: f32) -> Self {
        Self {
            mode: FadeMode::FadeOut,
            elapsed: Duration::ZERO,
            fade_out: Some(channel),
            fade_in: None,
            start_volume_out: start_volume,
            start_volume_in: 0.0,
        }
    }

    pub fn mode(&self) -> FadeMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != FadeMode::None
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Channel fading out, if any
    pub fn fade_out_channel(&self) -> Option<ChannelId> {
        self.fade_out
    }

    /// Channel fading in, if any
    pub fn fade_in_channel(&self) -> Option<ChannelId> {
        self.fade_in
    }

    pub fn start_volume_out(&self) -> f32 {
        self.start_volume_out
    }

    pub fn start_volume_in(&self) -> f32 {
        self.start_volume_in
    }

    pub(crate) fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    /// Normalized progress in `[0, 1]`; a zero duration is already complete
    pub fn progress(&self, duration: Duration) -> f32 {
        if duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    /// Whether the elapsed time has reached `duration` (inclusive)
    pub fn is_complete(&self, duration: Duration) -> bool {
        self.elapsed >= duration
    }

    /// Volume of the fading-out channel at progress `t`
    pub fn out_volume(&self, curve: FadeCurve, t: f32) -> f32 {
        self.start_volume_out * curve.gain(t, true)
    }

    /// Volume of the fading-in channel at progress `t`
    pub fn in_volume(&self, curve: FadeCurve, t: f32, target: f32) -> f32 {
        let volume = self.start_volume_in + (target - self.start_volume_in) * curve.gain(t, false);
        // Keep float error from stepping past either endpoint
        let (low, high) = if self.start_volume_in <= target {
            (self.start_volume_in, target)
        } else {
            (target, self.start_volume_in)
        };
        volume.clamp(low, high)
    }

    /// Back to `FadeMode::None` with both references unset
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
