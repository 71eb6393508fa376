//! Mixer channel strip
//!
//! A channel reads one input bus, adds its DC-blocked feedback tap scaled by
//! the smoothed feedback amount, and pans the result into the stereo mix.
//! The pre-pan sum is what gets written back into the channel's feedback
//! lane.

use super::coefficients::Coefficients;
use super::dc_blocker::DcBlocker;
use super::modulation::{modulate_feedback, modulate_pan};
use super::panner::equal_power_pan;
use super::smoother::ParameterSmoother;
use crate::params::{ChannelParam, ParamSource, ParameterLayout};
use crate::types::{BusFrames, StereoSample};

/// Per-block parameter snapshot for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    /// Audio input bus (0 = none)
    pub input_bus: i32,
    /// Feedback amount 0..1
    pub feedback: f32,
    /// Feedback CV bus (0 = none)
    pub feedback_cv_bus: i32,
    /// Feedback CV depth 0..1
    pub feedback_cv_depth: f32,
    /// Pan -100..100
    pub pan: f32,
    /// Pan CV bus (0 = none)
    pub pan_cv_bus: i32,
    /// Pan CV depth 0..1
    pub pan_cv_depth: f32,
}

impl ChannelConfig {
    /// Read channel `channel` (0-based) from raw parameters
    pub fn read<P: ParamSource + ?Sized>(layout: &ParameterLayout, params: &P, channel: usize) -> Self {
        let raw = |p: ChannelParam| params.raw(layout.channel_param(channel, p));
        Self {
            input_bus: raw(ChannelParam::Input),
            feedback: raw(ChannelParam::Feedback) as f32 / 100.0,
            feedback_cv_bus: raw(ChannelParam::FeedbackCv),
            feedback_cv_depth: raw(ChannelParam::FeedbackCvDepth) as f32 / 100.0,
            pan: raw(ChannelParam::Pan) as f32,
            pan_cv_bus: raw(ChannelParam::PanCv),
            pan_cv_depth: raw(ChannelParam::PanCvDepth) as f32 / 100.0,
        }
    }

    /// Feedback target for `frame`, including CV when a bus is assigned
    #[inline]
    pub fn feedback_target(&self, busses: &BusFrames<'_>, frame: usize) -> f32 {
        match busses.try_read(self.feedback_cv_bus, frame) {
            Some(cv) => modulate_feedback(self.feedback, cv, self.feedback_cv_depth),
            None => self.feedback,
        }
    }

    /// Pan target for `frame`, including CV when a bus is assigned
    #[inline]
    pub fn pan_target(&self, busses: &BusFrames<'_>, frame: usize) -> f32 {
        match busses.try_read(self.pan_cv_bus, frame) {
            Some(cv) => modulate_pan(self.pan, cv, self.pan_cv_depth),
            None => self.pan,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            input_bus: 0,
            feedback: 0.0,
            feedback_cv_bus: 0,
            feedback_cv_depth: 0.5,
            pan: 0.0,
            pan_cv_bus: 0,
            pan_cv_depth: 0.5,
        }
    }
}

/// Runtime state of one channel
#[derive(Debug, Clone, Copy)]
pub struct ChannelState {
    feedback: ParameterSmoother,
    pan: ParameterSmoother,
    dc: DcBlocker,
}

impl ChannelState {
    pub const fn new() -> Self {
        Self {
            feedback: ParameterSmoother::new(0.0),
            pan: ParameterSmoother::new(0.0),
            dc: DcBlocker::new(),
        }
    }

    /// Process one frame.
    ///
    /// Returns the value to write into the feedback lane and the panned
    /// stereo contribution.
    #[inline]
    pub fn process(
        &mut self,
        input: f32,
        tap: f32,
        feedback_target: f32,
        pan_target: f32,
        coeffs: &Coefficients,
    ) -> (f32, StereoSample) {
        let feedback = self.feedback.next(feedback_target, coeffs.smoothing);
        let pan = self.pan.next(pan_target, coeffs.smoothing);

        let blocked = self.dc.process(tap, coeffs.dc_blocker);
        let signal = input + blocked * feedback;

        let (gain_l, gain_r) = equal_power_pan(pan);
        (signal, StereoSample::new(signal * gain_l, signal * gain_r))
    }

    /// Current smoothed feedback amount
    pub fn feedback(&self) -> f32 {
        self.feedback.value()
    }

    /// Current smoothed pan
    pub fn pan(&self) -> f32 {
        self.pan.value()
    }

    /// Return smoothers and filter to their initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}
