//! Core types for the crossfade engine

use crate::curve::FadeCurve;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque reference to an audio clip
///
/// The engine only hands this to the playback backend; it never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipRef(String);

impl ClipRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClipRef {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tunable engine behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Transition duration in milliseconds (0 = every transition is instant)
    pub fade_duration_ms: u32,

    /// Steady-state volume of a fully faded-in channel
    pub target_volume: f32,

    /// Start a same-clip crossfade when the active clip is about to end
    pub auto_crossfade_near_end: bool,

    /// Envelope shape
    pub curve: FadeCurve,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fade_duration_ms: 3000,
            target_volume: 1.0,
            auto_crossfade_near_end: true,
            curve: FadeCurve::Linear,
        }
    }
}

impl EngineSettings {
    /// Fade duration as a `Duration`
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.fade_duration_ms))
    }

    /// Clamp out-of-range values (negative or NaN volume becomes silence)
    pub fn sanitized(mut self) -> Self {
        self.target_volume = clamp_volume(self.target_volume);
        self
    }
}

/// Static engine configuration: the clip sequence plus settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ordered clip sequence (may be empty)
    #[serde(default)]
    pub clips: Vec<ClipRef>,

    #[serde(default)]
    pub settings: EngineSettings,
}

impl EngineConfig {
    pub fn new(clips: Vec<ClipRef>, settings: EngineSettings) -> Self {
        Self { clips, settings }
    }
}

/// Volumes are non-negative; NaN is treated as silence
pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.max(0.0)
    }
}
