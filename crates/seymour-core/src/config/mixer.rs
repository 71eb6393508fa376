//! Mixer settings file
//!
//! Human-facing view of the raw parameter table: percentages as percent,
//! delays in milliseconds, saturation by name. [`MixerConfig::raw_values`]
//! converts it into the integers the engine reads.

use serde::{Deserialize, Serialize};

use crate::engine::Saturation;
use crate::error::ParamResult;
use crate::params::{ChannelParam, GlobalParam, ParameterLayout, SharedParams};
use crate::types::DEFAULT_SAMPLE_RATE;

/// How the mix is written to the output busses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Add to whatever is already on the bus
    Add,
    /// Overwrite the bus
    #[default]
    Replace,
}

impl OutputMode {
    pub fn as_raw(self) -> i32 {
        match self {
            OutputMode::Add => 0,
            OutputMode::Replace => 1,
        }
    }
}

/// Settings for one mixer channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Audio input bus (0 = none)
    pub input_bus: i32,
    /// Feedback amount, 0-100 %
    pub feedback_percent: f32,
    /// Feedback CV bus (0 = none)
    pub feedback_cv_bus: i32,
    /// Feedback CV depth, 0-100 %
    pub feedback_cv_depth_percent: f32,
    /// Pan, -100 (left) to 100 (right)
    pub pan: i32,
    /// Pan CV bus (0 = none)
    pub pan_cv_bus: i32,
    /// Pan CV depth, 0-100 %
    pub pan_cv_depth_percent: f32,
}

impl ChannelSettings {
    /// Defaults for channel `channel` (0-based), reading the matching input bus
    pub fn for_channel(channel: usize) -> Self {
        Self {
            input_bus: channel as i32 + 1,
            ..Self::default()
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            input_bus: 1,
            feedback_percent: 0.0,
            feedback_cv_bus: 0,
            feedback_cv_depth_percent: 50.0,
            pan: 0,
            pan_cv_bus: 0,
            pan_cv_depth_percent: 50.0,
        }
    }
}

/// Complete mixer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Engine sample rate when no audio source dictates one
    pub sample_rate: u32,
    /// Frames per processing block
    pub block_size: usize,
    /// One entry per channel (1 to 8)
    pub channels: Vec<ChannelSettings>,
    pub output_left: i32,
    pub output_right: i32,
    pub output_mode: OutputMode,
    /// Master level, 0-100 %
    pub master_level_percent: f32,
    /// Limiter lookahead, 0.5-20 ms
    pub lookahead_ms: f32,
    /// Feedback delay, 0.5-20 ms
    pub feedback_delay_ms: f32,
    pub saturation: Saturation,
    /// Squash, 0-100 % (higher means a lower limiter threshold)
    pub squash_percent: f32,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE as u32,
            block_size: 128,
            channels: (0..2).map(ChannelSettings::for_channel).collect(),
            output_left: 13,
            output_right: 14,
            output_mode: OutputMode::Replace,
            master_level_percent: 100.0,
            lookahead_ms: 5.0,
            feedback_delay_ms: 5.0,
            saturation: Saturation::Soft,
            squash_percent: 56.0,
        }
    }
}

impl MixerConfig {
    /// Number of channels requested by this config
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Raw parameter values for `layout`, clamped into each parameter's range.
    ///
    /// Channels the layout has no room for are ignored; layout channels the
    /// config does not mention keep their defaults.
    pub fn raw_values(&self, layout: &ParameterLayout) -> Vec<i32> {
        let mut raw = layout.defaults();
        let mut set = |index: usize, value: i32| {
            if let Some(info) = layout.params().get(index) {
                raw[index] = info.clamp(value);
            }
        };

        if self.channels.len() > layout.num_channels() {
            log::warn!(
                "MixerConfig: {} channels configured, only {} used",
                self.channels.len(),
                layout.num_channels()
            );
        }

        for (ch, settings) in self.channels.iter().take(layout.num_channels()).enumerate() {
            set(layout.channel_param(ch, ChannelParam::Input), settings.input_bus);
            set(
                layout.channel_param(ch, ChannelParam::Feedback),
                percent_to_raw(settings.feedback_percent),
            );
            set(
                layout.channel_param(ch, ChannelParam::FeedbackCv),
                settings.feedback_cv_bus,
            );
            set(
                layout.channel_param(ch, ChannelParam::FeedbackCvDepth),
                percent_to_raw(settings.feedback_cv_depth_percent),
            );
            set(layout.channel_param(ch, ChannelParam::Pan), settings.pan);
            set(layout.channel_param(ch, ChannelParam::PanCv), settings.pan_cv_bus);
            set(
                layout.channel_param(ch, ChannelParam::PanCvDepth),
                percent_to_raw(settings.pan_cv_depth_percent),
            );
        }

        set(layout.global_param(GlobalParam::OutputL), self.output_left);
        set(layout.global_param(GlobalParam::OutputR), self.output_right);
        set(layout.global_param(GlobalParam::OutputMode), self.output_mode.as_raw());
        set(
            layout.global_param(GlobalParam::MasterLevel),
            percent_to_raw(self.master_level_percent),
        );
        set(layout.global_param(GlobalParam::Lookahead), ms_to_raw(self.lookahead_ms));
        set(layout.global_param(GlobalParam::Saturation), self.saturation.as_raw());
        set(
            layout.global_param(GlobalParam::FeedbackDelay),
            ms_to_raw(self.feedback_delay_ms),
        );
        set(
            layout.global_param(GlobalParam::Squash),
            percent_to_raw(self.squash_percent),
        );

        raw
    }

    /// Store this config into a shared parameter bank built from `layout`
    pub fn apply(&self, layout: &ParameterLayout, params: &SharedParams) -> ParamResult<()> {
        for (index, value) in self.raw_values(layout).into_iter().enumerate() {
            params.set(index, value)?;
        }
        Ok(())
    }
}

fn percent_to_raw(percent: f32) -> i32 {
    percent.round() as i32
}

/// Milliseconds to tenths of a millisecond
fn ms_to_raw(ms: f32) -> i32 {
    (ms * 10.0).round() as i32
}
