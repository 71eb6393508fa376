//! One-pole parameter smoothing

/// Exponential smoother for control-rate values
///
/// Each call to [`next`](Self::next) moves the current value a fixed
/// fraction `k` of the way to the target, removing the stepwise "zipper"
/// artifacts a raw parameter change would cause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSmoother {
    value: f32,
}

impl ParameterSmoother {
    /// Create a smoother starting at `initial`
    pub const fn new(initial: f32) -> Self {
        Self { value: initial }
    }

    /// Advance one sample toward `target` with step `k`
    #[inline]
    pub fn next(&mut self, target: f32, k: f32) -> f32 {
        self.value += k * (target - self.value);
        self.value
    }

    /// Current smoothed value
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Jump straight to `value`
    pub fn snap(&mut self, value: f32) {
        self.value = value;
    }
}
