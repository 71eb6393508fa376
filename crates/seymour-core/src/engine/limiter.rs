//! Lookahead safety limiter with selectable saturation
//!
//! Last stage of the signal path:
//!   mix → master level → **limiter** → output busses
//!
//! The limiter delays the audio by a configurable lookahead and computes
//! gain reduction from the *undelayed* signal, so by the time a peak leaves
//! the delay line the gain is already coming down.
//!
//! # Algorithm
//!
//! 1. The current stereo frame is written into a ring-buffer delay line.
//! 2. The frame written `lookahead` samples ago is read back.
//! 3. An asymmetric envelope follower tracks the peak of the current frame
//!    (fast attack, slower release).
//! 4. Target gain is `threshold / envelope` above the threshold, unity below.
//! 5. The applied gain is smoothed toward the target every sample, in both
//!    directions, so gain changes never click.
//! 6. The delayed frame is scaled by the smoothed gain. While limiting is
//!    engaged the result is normalized by the threshold, shaped by the
//!    selected [`Saturation`] curve and scaled back.
//!
//! The threshold itself is not smoothed: it is recomputed from the squash
//! control at the start of every block for prompt response.
//!
//! No heap allocation occurs after construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::coefficients::Coefficients;
use super::saturation::Saturation;
use crate::types::{StereoSample, MAX_LOOKAHEAD_SAMPLES};

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Threshold at 0 % squash (volts)
pub const THRESHOLD_MAX_VOLTS: f32 = 10.0;

/// Threshold at 100 % squash (volts)
pub const THRESHOLD_MIN_VOLTS: f32 = 1.0;

/// Floor for the threshold so the gain computation never divides by zero
const MIN_THRESHOLD: f32 = 1.0e-6;

/// Smoothed gain below this counts as active reduction
const GAIN_ENGAGED: f32 = 0.9999;

/// Map the 0–100 % squash control to a limiter threshold in volts.
///
/// Linear between [`THRESHOLD_MAX_VOLTS`] (0 %) and [`THRESHOLD_MIN_VOLTS`]
/// (100 %). Out-of-range percentages are clamped.
pub fn squash_threshold(squash_percent: f32) -> f32 {
    let squash = (squash_percent / 100.0).clamp(0.0, 1.0);
    THRESHOLD_MAX_VOLTS - (THRESHOLD_MAX_VOLTS - THRESHOLD_MIN_VOLTS) * squash
}

// ═══════════════════════════════════════════════════════════════════════════════
// Limiter
// ═══════════════════════════════════════════════════════════════════════════════

/// Stereo lookahead limiter.
///
/// Below the threshold (and once the gain has recovered) the output is the
/// input delayed by `lookahead` samples, bit for bit.
pub struct LookaheadLimiter {
    /// Threshold in volts for the current block
    threshold: f32,
    /// Lookahead in samples, always in `[1, size]`
    lookahead: usize,
    /// Active saturation curve
    saturation: Saturation,

    // ── Ring buffer (allocated once) ──

    /// Stereo delay line
    delay: Box<[StereoSample]>,
    /// Write cursor
    write_pos: usize,

    // ── Envelope and gain ──

    /// Peak envelope of the undelayed signal
    envelope: f32,
    /// Smoothed gain applied to the delayed signal (1.0 = unity)
    gain: f32,
    attack_coeff: f32,
    release_coeff: f32,
    gain_coeff: f32,

    /// Set when limiting engaged during a block (for a UI indicator).
    /// Audio thread sets to true; UI thread reads and clears.
    limit_active: Arc<AtomicBool>,
    /// Whether limiting engaged during the current block
    limited_this_block: bool,
}

impl LookaheadLimiter {
    /// Create a limiter with the default ring size (20 ms @ 96 kHz)
    pub fn new(coeffs: &Coefficients) -> Self {
        Self::with_size(coeffs, MAX_LOOKAHEAD_SAMPLES)
    }

    /// Create a limiter with a ring of `size` frames
    pub fn with_size(coeffs: &Coefficients, size: usize) -> Self {
        let size = size.max(1);
        Self {
            threshold: squash_threshold(0.0),
            lookahead: 1,
            saturation: Saturation::default(),
            delay: vec![StereoSample::silence(); size].into_boxed_slice(),
            write_pos: 0,
            envelope: 0.0,
            gain: 1.0,
            attack_coeff: coeffs.envelope_attack,
            release_coeff: coeffs.envelope_release,
            gain_coeff: coeffs.gain_smoothing,
            limit_active: Arc::new(AtomicBool::new(false)),
            limited_this_block: false,
        }
    }

    /// Ring length in frames
    pub fn size(&self) -> usize {
        self.delay.len()
    }

    /// Latency in samples introduced by this limiter
    pub fn latency_samples(&self) -> usize {
        self.lookahead
    }

    /// Set the lookahead, clamped into `[1, size]`. Returns the stored value.
    pub fn set_lookahead_samples(&mut self, samples: usize) -> usize {
        self.lookahead = samples.clamp(1, self.delay.len());
        self.lookahead
    }

    /// Set the threshold in volts (guarded to stay positive)
    pub fn set_threshold(&mut self, volts: f32) {
        self.threshold = if volts.is_finite() {
            volts.max(MIN_THRESHOLD)
        } else {
            THRESHOLD_MAX_VOLTS
        };
    }

    /// Current threshold in volts
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_saturation(&mut self, saturation: Saturation) {
        self.saturation = saturation;
    }

    pub fn saturation(&self) -> Saturation {
        self.saturation
    }

    /// Current peak envelope
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// Current smoothed gain (1.0 = no reduction)
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Swap in coefficients for a new sample rate
    pub fn set_coefficients(&mut self, coeffs: &Coefficients) {
        self.attack_coeff = coeffs.envelope_attack;
        self.release_coeff = coeffs.envelope_release;
        self.gain_coeff = coeffs.gain_smoothing;
    }

    /// Get the limiting indicator atomic (shared with UI thread)
    pub fn limit_indicator(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.limit_active)
    }

    /// Start a block: latch the threshold and curve for its duration
    pub fn begin_block(&mut self, threshold_volts: f32, saturation: Saturation) {
        self.set_threshold(threshold_volts);
        self.saturation = saturation;
        self.limited_this_block = false;
    }

    /// Finish a block: publish the indicator if limiting engaged
    pub fn end_block(&mut self) {
        if self.limited_this_block {
            self.limit_active.store(true, Ordering::Relaxed);
        }
    }

    /// Process one stereo frame, returning the delayed and limited frame
    #[inline]
    pub fn process(&mut self, input: StereoSample) -> StereoSample {
        let size = self.delay.len();

        // ── 1. Write the current frame into the delay line ───────────────
        self.delay[self.write_pos] = input;

        // ── 2. Read the frame from `lookahead` samples ago ───────────────
        let read_pos = (self.write_pos + size - self.lookahead) % size;
        let delayed = self.delay[read_pos];

        // ── 3. Envelope follows the *current* peak ───────────────────────
        let peak = input.peak();
        let env_coeff = if peak > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope += env_coeff * (peak - self.envelope);

        // ── 4. Target gain ───────────────────────────────────────────────
        let target = if self.envelope > self.threshold {
            self.threshold / self.envelope
        } else {
            1.0
        };

        // ── 5. Smooth the gain both ways ─────────────────────────────────
        self.gain += self.gain_coeff * (target - self.gain);

        // ── 6. Apply to the delayed frame, saturate while engaged ────────
        let limited = delayed * self.gain;
        let output = if self.gain < GAIN_ENGAGED || self.envelope > self.threshold {
            self.limited_this_block = true;
            let t = self.threshold;
            StereoSample::new(
                self.saturation.apply(limited.left / t) * t,
                self.saturation.apply(limited.right / t) * t,
            )
        } else {
            limited
        };

        // Advance ring-buffer cursor
        self.write_pos = (self.write_pos + 1) % size;

        output
    }

    /// Clear the delay line and return the envelope and gain to rest
    pub fn reset(&mut self) {
        self.delay.fill(StereoSample::silence());
        self.write_pos = 0;
        self.envelope = 0.0;
        self.gain = 1.0;
        self.limited_this_block = false;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
