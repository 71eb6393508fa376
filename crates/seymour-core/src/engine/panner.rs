//! Equal-power pan law

use std::f32::consts::FRAC_PI_2;

/// Left/right gains for a pan position in `[-100, 100]`
///
/// `gain_l² + gain_r² = 1` for every position, so perceived loudness stays
/// constant across the stereo field. Positions outside the range are clamped.
#[inline]
pub fn equal_power_pan(pan: f32) -> (f32, f32) {
    let p = (pan.clamp(-100.0, 100.0) + 100.0) / 200.0;
    let angle = p * FRAC_PI_2;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_endpoints() {
        let (l, r) = equal_power_pan(-100.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);

        let (l, r) = equal_power_pan(100.0);
        assert!(l.abs() < 1e-6);
        assert!((r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_centre_is_minus_3db() {
        let (l, r) = equal_power_pan(0.0);
        assert!((l - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((r - FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(equal_power_pan(-250.0), equal_power_pan(-100.0));
        assert_eq!(equal_power_pan(400.0), equal_power_pan(100.0));
    }
}
