//! Sample-rate derived filter coefficients
//!
//! Every one-pole in the signal path is computed once per instance from the
//! host sample rate. The engine owns one `Coefficients` value and replaces it
//! wholesale when the sample rate changes.

use std::f32::consts::TAU;

use crate::types::DEFAULT_SAMPLE_RATE;

/// DC blocker corner frequency (Hz)
const DC_BLOCKER_HZ: f32 = 5.0;
/// Parameter smoothing corner (Hz)
const SMOOTHING_HZ: f32 = 50.0;
/// Envelope follower attack corner (Hz)
const ENVELOPE_ATTACK_HZ: f32 = 1000.0;
/// Envelope follower release corner (Hz)
const ENVELOPE_RELEASE_HZ: f32 = 50.0;
/// Gain-reduction smoothing corner (Hz)
const GAIN_SMOOTHING_HZ: f32 = 30.0;

/// Precomputed one-pole coefficients for a given sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Sample rate these coefficients were computed for
    pub sample_rate: f32,
    /// DC blocker pole `R` in `y = x - x1 + R * y1`
    pub dc_blocker: f32,
    /// Control-rate smoothing step (feedback, pan, master level)
    pub smoothing: f32,
    /// Envelope step when the peak is rising
    pub envelope_attack: f32,
    /// Envelope step when the peak is falling
    pub envelope_release: f32,
    /// Gain-reduction smoothing step
    pub gain_smoothing: f32,
}

impl Coefficients {
    /// Compute all coefficients for `sample_rate`.
    ///
    /// Non-finite or non-positive rates fall back to 48 kHz so the poles stay
    /// inside the unit circle.
    pub fn new(sample_rate: f32) -> Self {
        let sr = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };

        Self {
            sample_rate: sr,
            dc_blocker: 1.0 - TAU * DC_BLOCKER_HZ / sr,
            smoothing: one_pole_step(SMOOTHING_HZ, sr),
            envelope_attack: one_pole_step(ENVELOPE_ATTACK_HZ, sr),
            envelope_release: one_pole_step(ENVELOPE_RELEASE_HZ, sr),
            gain_smoothing: one_pole_step(GAIN_SMOOTHING_HZ, sr),
        }
    }

    /// Convert a duration in milliseconds to whole samples (truncating)
    #[inline]
    pub fn ms_to_samples(&self, ms: f32) -> usize {
        (self.sample_rate * ms / 1000.0).max(0.0) as usize
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

/// Step size `k` of `y += k * (x - y)` for a corner frequency
#[inline]
fn one_pole_step(corner_hz: f32, sample_rate: f32) -> f32 {
    1.0 - (-TAU * corner_hz / sample_rate).exp()
}
