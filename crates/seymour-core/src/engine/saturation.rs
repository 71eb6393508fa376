//! Output saturation curves
//!
//! Stateless waveshapers applied by the limiter once gain reduction is
//! engaged. The limiter normalizes the signal by its threshold before calling
//! [`Saturation::apply`] and scales the result back afterwards, so every
//! curve works on a signal where `±1.0` is the threshold.
//!
//! - [`Saturation::Soft`]: `tanh`, smooth odd-harmonic rounding
//! - [`Saturation::Tube`]: asymmetric `tanh`, adds even harmonics
//! - [`Saturation::Hard`]: linear to 0.8, half-slope knee to 1.0, then clamp

use serde::{Deserialize, Serialize};

/// Knee start for [`Saturation::Hard`]
const HARD_KNEE: f32 = 0.8;
/// Slope inside the hard knee
const HARD_KNEE_SLOPE: f32 = 0.5;

/// Saturation curve selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Saturation {
    /// Hyperbolic tangent
    #[default]
    Soft,
    /// Asymmetric tangent: gentler on the positive half, harder on the negative
    Tube,
    /// Piecewise linear knee with a hard ceiling at ±1
    Hard,
}

impl Saturation {
    /// All curves in selector order
    pub const ALL: [Saturation; 3] = [Saturation::Soft, Saturation::Tube, Saturation::Hard];

    /// Map a raw selector value. Unknown values fall back to `Soft`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Saturation::Tube,
            2 => Saturation::Hard,
            _ => Saturation::Soft,
        }
    }

    /// Raw selector value for this curve
    pub fn as_raw(self) -> i32 {
        match self {
            Saturation::Soft => 0,
            Saturation::Tube => 1,
            Saturation::Hard => 2,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Saturation::Soft => "Soft",
            Saturation::Tube => "Tube",
            Saturation::Hard => "Hard",
        }
    }

    /// Shape one normalized sample
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Saturation::Soft => x.tanh(),
            Saturation::Tube => {
                if x >= 0.0 {
                    (x * 0.8).tanh() * 1.1
                } else {
                    (x * 1.2).tanh() * 0.9
                }
            }
            Saturation::Hard => {
                if x > 1.0 {
                    1.0
                } else if x < -1.0 {
                    -1.0
                } else if x > HARD_KNEE {
                    HARD_KNEE + (x - HARD_KNEE) * HARD_KNEE_SLOPE
                } else if x < -HARD_KNEE {
                    -HARD_KNEE + (x + HARD_KNEE) * HARD_KNEE_SLOPE
                } else {
                    x
                }
            }
        }
    }
}
