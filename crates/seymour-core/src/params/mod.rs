//! Parameter definitions and index mapping
//!
//! The host stores every parameter as a raw integer. Percentages are stored
//! as whole percent (raw / 100), millisecond values in tenths (raw / 10), bus
//! selectors as 1-based bus numbers with 0 meaning "none".
//!
//! The parameter table depends on the channel count: the seven per-channel
//! parameters are repeated for every channel, followed by the eight global
//! parameters. [`ParameterLayout`] builds that table once at instantiation
//! and answers index lookups afterwards; nothing here runs on the audio
//! thread except the lookups themselves.

mod bank;

pub use bank::{ParamSource, SharedParams};

use crate::error::{ParamError, ParamResult};
use crate::types::MAX_CHANNELS;

/// Unit of a raw parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Audio input bus selector (0 = none)
    AudioInput,
    /// Audio output bus selector
    AudioOutput,
    /// CV input bus selector (0 = none)
    CvInput,
    /// 0 = add to the bus, 1 = replace the bus contents
    OutputMode,
    /// Whole percent
    Percent,
    /// Tenths of a millisecond
    Milliseconds,
    /// Index into a list of names
    Enum,
    /// Plain number
    None,
}

/// Definition of one raw parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    /// Parameter name for display
    pub name: &'static str,
    /// Minimum raw value
    pub min: i32,
    /// Maximum raw value
    pub max: i32,
    /// Default raw value
    pub default: i32,
    /// Unit of the raw value
    pub unit: ParamUnit,
    /// Names for `ParamUnit::Enum` values
    pub enum_names: &'static [&'static str],
}

impl ParamInfo {
    /// Create a parameter with a range and default
    pub const fn new(name: &'static str, min: i32, max: i32, default: i32) -> Self {
        Self {
            name,
            min,
            max,
            default,
            unit: ParamUnit::None,
            enum_names: &[],
        }
    }

    /// Set the unit
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Attach enum value names
    pub const fn with_enum_names(mut self, names: &'static [&'static str]) -> Self {
        self.unit = ParamUnit::Enum;
        self.enum_names = names;
        self
    }

    /// Clamp a raw value into this parameter's range
    #[inline]
    pub fn clamp(&self, raw: i32) -> i32 {
        raw.clamp(self.min, self.max)
    }

    /// Convert a raw value to its scaled value (percent → 0..1, tenths → ms)
    pub fn scaled(&self, raw: i32) -> f32 {
        match self.unit {
            ParamUnit::Percent => raw as f32 / 100.0,
            ParamUnit::Milliseconds => raw as f32 / 10.0,
            _ => raw as f32,
        }
    }
}

/// Per-channel parameters, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ChannelParam {
    Input = 0,
    Feedback = 1,
    FeedbackCv = 2,
    FeedbackCvDepth = 3,
    Pan = 4,
    PanCv = 5,
    PanCvDepth = 6,
}

impl ChannelParam {
    /// Number of per-channel parameters
    pub const COUNT: usize = 7;

    pub const ALL: [ChannelParam; Self::COUNT] = [
        ChannelParam::Input,
        ChannelParam::Feedback,
        ChannelParam::FeedbackCv,
        ChannelParam::FeedbackCvDepth,
        ChannelParam::Pan,
        ChannelParam::PanCv,
        ChannelParam::PanCvDepth,
    ];

    /// Convert from offset within a channel block
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Template definition (the input default is overridden per channel)
    pub fn info(self) -> ParamInfo {
        match self {
            ChannelParam::Input => ParamInfo::new("Input", 0, 28, 1).with_unit(ParamUnit::AudioInput),
            ChannelParam::Feedback => ParamInfo::new("Feedback", 0, 100, 0).with_unit(ParamUnit::Percent),
            ChannelParam::FeedbackCv => ParamInfo::new("FB CV", 0, 28, 0).with_unit(ParamUnit::CvInput),
            ChannelParam::FeedbackCvDepth => {
                ParamInfo::new("FB Depth", 0, 100, 50).with_unit(ParamUnit::Percent)
            }
            ChannelParam::Pan => ParamInfo::new("Pan", -100, 100, 0),
            ChannelParam::PanCv => ParamInfo::new("Pan CV", 0, 28, 0).with_unit(ParamUnit::CvInput),
            ChannelParam::PanCvDepth => {
                ParamInfo::new("Pan Depth", 0, 100, 50).with_unit(ParamUnit::Percent)
            }
        }
    }
}

/// Saturation curve names, indexed by raw selector value
pub const SATURATION_NAMES: &[&str] = &["Soft", "Tube", "Hard"];

/// Global parameters, in table order (placed after all channel blocks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum GlobalParam {
    OutputL = 0,
    OutputR = 1,
    OutputMode = 2,
    MasterLevel = 3,
    Lookahead = 4,
    Saturation = 5,
    FeedbackDelay = 6,
    Squash = 7,
}

impl GlobalParam {
    /// Number of global parameters
    pub const COUNT: usize = 8;

    pub const ALL: [GlobalParam; Self::COUNT] = [
        GlobalParam::OutputL,
        GlobalParam::OutputR,
        GlobalParam::OutputMode,
        GlobalParam::MasterLevel,
        GlobalParam::Lookahead,
        GlobalParam::Saturation,
        GlobalParam::FeedbackDelay,
        GlobalParam::Squash,
    ];

    /// Convert from offset within the global block
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn info(self) -> ParamInfo {
        match self {
            GlobalParam::OutputL => ParamInfo::new("Out L", 1, 28, 13).with_unit(ParamUnit::AudioOutput),
            GlobalParam::OutputR => ParamInfo::new("Out R", 1, 28, 14).with_unit(ParamUnit::AudioOutput),
            GlobalParam::OutputMode => ParamInfo::new("Mode", 0, 1, 1).with_unit(ParamUnit::OutputMode),
            GlobalParam::MasterLevel => ParamInfo::new("Level", 0, 100, 100).with_unit(ParamUnit::Percent),
            GlobalParam::Lookahead => {
                ParamInfo::new("Lookahead", 5, 200, 50).with_unit(ParamUnit::Milliseconds)
            }
            GlobalParam::Saturation => {
                ParamInfo::new("Saturation", 0, 2, 0).with_enum_names(SATURATION_NAMES)
            }
            GlobalParam::FeedbackDelay => {
                ParamInfo::new("FB Delay", 5, 200, 50).with_unit(ParamUnit::Milliseconds)
            }
            // 0% = least squash (higher threshold), 100% = most squash
            GlobalParam::Squash => ParamInfo::new("Squash", 0, 100, 56).with_unit(ParamUnit::Percent),
        }
    }
}

/// Where a flat parameter index points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    Channel(usize, ChannelParam),
    Global(GlobalParam),
}

/// Immutable parameter table for one instance
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterLayout {
    num_channels: usize,
    params: Vec<ParamInfo>,
}

impl ParameterLayout {
    /// Build the table for `num_channels` channels.
    ///
    /// The channel count is clamped into `1..=MAX_CHANNELS`. Channel inputs
    /// default to sequential busses (channel 1 reads bus 1, and so on).
    pub fn new(num_channels: usize) -> Self {
        let clamped = num_channels.clamp(1, MAX_CHANNELS);
        if clamped != num_channels {
            log::warn!(
                "ParameterLayout: channel count {} out of range, clamped to {}",
                num_channels,
                clamped
            );
        }

        let mut params = Vec::with_capacity(clamped * ChannelParam::COUNT + GlobalParam::COUNT);
        for ch in 0..clamped {
            for p in ChannelParam::ALL {
                let mut info = p.info();
                if p == ChannelParam::Input {
                    info.default = ch as i32 + 1;
                }
                params.push(info);
            }
        }
        params.extend(GlobalParam::ALL.iter().map(|g| g.info()));

        log::debug!(
            "ParameterLayout: {} channels, {} parameters",
            clamped,
            params.len()
        );

        Self {
            num_channels: clamped,
            params,
        }
    }

    /// Number of mixer channels
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Total number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// All parameter definitions in index order
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Definition for a flat index
    pub fn info(&self, index: usize) -> ParamResult<&ParamInfo> {
        self.params.get(index).ok_or(ParamError::UnknownIndex {
            index,
            count: self.params.len(),
        })
    }

    /// Flat index of a per-channel parameter (channel is 0-based)
    #[inline]
    pub fn channel_param(&self, channel: usize, param: ChannelParam) -> usize {
        debug_assert!(channel < self.num_channels);
        channel * ChannelParam::COUNT + param as usize
    }

    /// Flat index of a global parameter
    #[inline]
    pub fn global_param(&self, param: GlobalParam) -> usize {
        self.global_base() + param as usize
    }

    /// Index of the first global parameter
    #[inline]
    pub fn global_base(&self) -> usize {
        self.num_channels * ChannelParam::COUNT
    }

    /// Resolve a flat index
    pub fn locate(&self, index: usize) -> ParamResult<ParamId> {
        let base = self.global_base();
        let id = if index < base {
            ChannelParam::from_index(index % ChannelParam::COUNT)
                .map(|p| ParamId::Channel(index / ChannelParam::COUNT, p))
        } else {
            GlobalParam::from_index(index - base).map(ParamId::Global)
        };
        id.ok_or(ParamError::UnknownIndex {
            index,
            count: self.params.len(),
        })
    }

    /// Default raw values in index order
    pub fn defaults(&self) -> Vec<i32> {
        self.params.iter().map(|p| p.default).collect()
    }
}
