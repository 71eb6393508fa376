//! DC blocker for the feedback path
//!
//! `y[n] = x[n] - x[n-1] + R * y[n-1]`. Only the feedback tap goes through
//! this filter; the dry input never does.

/// Per-channel one-pole high-pass state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DcBlocker {
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub const fn new() -> Self {
        Self { x1: 0.0, y1: 0.0 }
    }

    /// Filter one sample with pole `r`
    #[inline]
    pub fn process(&mut self, input: f32, r: f32) -> f32 {
        let output = input - self.x1 + r * self.y1;
        self.x1 = input;
        self.y1 = output;
        output
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Coefficients;

    #[test]
    fn test_constant_input_decays_to_zero() {
        let r = Coefficients::new(48000.0).dc_blocker;
        let mut dc = DcBlocker::new();

        let first = dc.process(1.0, r);
        assert_eq!(first, 1.0);

        let mut out = first;
        for _ in 0..48000 {
            out = dc.process(1.0, r);
        }
        assert!(out.abs() < 1e-6, "DC not removed: {}", out);
    }

    #[test]
    fn test_passes_alternating_signal() {
        let r = Coefficients::new(48000.0).dc_blocker;
        let mut dc = DcBlocker::new();

        // Nyquist-rate square wave is far above the 5 Hz corner
        let mut out = 0.0;
        for n in 0..1000 {
            let x = if n % 2 == 0 { 1.0 } else { -1.0 };
            out = dc.process(x, r);
        }
        assert!(out.abs() > 0.99);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut dc = DcBlocker::new();
        dc.process(3.0, 0.99);
        dc.reset();
        assert_eq!(dc, DcBlocker::default());
    }
}
