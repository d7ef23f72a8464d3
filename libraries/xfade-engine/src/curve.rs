//! Fade curves for volume envelopes
//!
//! Every curve maps normalized fade progress to a gain in `[0.0, 1.0]` and is
//! monotonic, so an envelope shaped by any of them never overshoots its
//! start or target volume.
//!
//! - Linear: plain interpolation (default)
//! - SquareRoot: faster rise than linear
//! - S-Curve: slow start and end
//! - Equal Power: constant perceived loudness across a crossfade

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Envelope curve type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// Linear fade
    ///
    /// A linear crossfade keeps the amplitude sum constant but dips about 3dB
    /// in perceived loudness at the midpoint.
    #[default]
    Linear,

    /// Square root fade: t^0.5, rises quickly then slows down
    SquareRoot,

    /// S-Curve fade: slow start, fast middle, slow end
    SCurve,

    /// Equal power fade: sin/cos pair, `in² + out² = 1`
    EqualPower,
}

impl FadeCurve {
    /// Calculate the fade gain at a given position
    ///
    /// # Arguments
    /// * `position` - Normalized position in the fade (0.0 to 1.0)
    /// * `fade_out` - If true, calculates fade-out gain; if false, fade-in gain
    ///
    /// # Returns
    /// Gain multiplier (0.0 to 1.0)
    #[inline]
    pub fn gain(&self, position: f32, fade_out: bool) -> f32 {
        let position = if position.is_nan() {
            1.0
        } else {
            position.clamp(0.0, 1.0)
        };
        let t = if fade_out { 1.0 - position } else { position };

        let gain = match self {
            FadeCurve::Linear => t,
            FadeCurve::SquareRoot => {
                if t <= 0.0 {
                    0.0
                } else {
                    t.sqrt()
                }
            }
            FadeCurve::SCurve => (1.0 - (PI * t).cos()) * 0.5,
            FadeCurve::EqualPower => (t * PI * 0.5).sin(),
        };

        gain.clamp(0.0, 1.0)
    }

    /// Human-readable name for the curve
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::SquareRoot => "Square Root",
            FadeCurve::SCurve => "S-Curve",
            FadeCurve::EqualPower => "Equal Power",
        }
    }
}
