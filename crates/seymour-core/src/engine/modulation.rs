//! Audio-rate CV modulation of feedback amount and pan
//!
//! CV busses carry control voltages where ±5 V spans the full range of the
//! modulated parameter. Depth (0..1) sets how far the CV can pull the value
//! away from its knob setting.

/// CV voltage treated as full scale
pub const CV_FULL_SCALE_VOLTS: f32 = 5.0;

/// Blend feedback (0..1) toward a unipolar CV value.
///
/// The CV is mapped from ±5 V onto 0..1 (0 V = 0.5) and crossfaded with the
/// knob value by `depth`.
#[inline]
pub fn modulate_feedback(base: f32, cv_volts: f32, depth: f32) -> f32 {
    let cv = (cv_volts / CV_FULL_SCALE_VOLTS * 0.5 + 0.5).clamp(0.0, 1.0);
    base * (1.0 - depth) + cv * depth
}

/// Offset pan (-100..100) by a bipolar CV value; +5 V at full depth moves
/// the pan by +100.
#[inline]
pub fn modulate_pan(base: f32, cv_volts: f32, depth: f32) -> f32 {
    (base + cv_volts / CV_FULL_SCALE_VOLTS * 100.0 * depth).clamp(-100.0, 100.0)
}
