//! Common types for Seymour
//!
//! Fundamental sizing constants, the stereo sample type used by the limiter
//! ring buffer, and the view over host-owned bus frames.

/// Sample rate assumed when the host does not provide one (48kHz)
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// Maximum number of mixer channels per instance
pub const MAX_CHANNELS: usize = 8;

/// Number of busses exposed by the host (inputs, outputs and CV share one bank)
pub const NUM_BUSSES: usize = 28;

/// Highest sample rate the ring buffers are sized for
pub const MAX_SAMPLE_RATE: u32 = 96000;

/// Longest lookahead and feedback delay in milliseconds
pub const MAX_DELAY_MS: u32 = 20;

/// Lookahead ring size in stereo frames (20 ms @ 96 kHz)
pub const MAX_LOOKAHEAD_SAMPLES: usize = (MAX_SAMPLE_RATE * MAX_DELAY_MS / 1000) as usize;

/// Feedback ring size in frames per channel lane (20 ms @ 96 kHz)
pub const MAX_FEEDBACK_DELAY_SAMPLES: usize = (MAX_SAMPLE_RATE * MAX_DELAY_MS / 1000) as usize;

/// Audio sample type. Busses carry volts, so ±10.0 is a normal level.
pub type Sample = f32;

/// A single stereo sample (left and right channels)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    /// Create a new stereo sample
    #[inline]
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    /// Create a silent stereo sample
    #[inline]
    pub fn silence() -> Self {
        Self::default()
    }

    /// Get the peak amplitude (max of abs(left), abs(right))
    #[inline]
    pub fn peak(&self) -> Sample {
        self.left.abs().max(self.right.abs())
    }
}

impl std::ops::Add for StereoSample {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            left: self.left + other.left,
            right: self.right + other.right,
        }
    }
}

impl std::ops::AddAssign for StereoSample {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.left += other.left;
        self.right += other.right;
    }
}

impl std::ops::Mul<Sample> for StereoSample {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Sample) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
        }
    }
}

impl std::ops::MulAssign<Sample> for StereoSample {
    #[inline]
    fn mul_assign(&mut self, factor: Sample) {
        self.left *= factor;
        self.right *= factor;
    }
}

/// Host-owned bus frames for one processing block
///
/// The host hands over a single contiguous slice in which bus `b` (1-based)
/// occupies `[(b - 1) * num_frames, b * num_frames)`. Bus index 0 means
/// "none"; reads from it (or from any index past the last bus) yield silence
/// and writes to it are dropped.
pub struct BusFrames<'a> {
    frames: &'a mut [Sample],
    num_frames: usize,
    num_busses: usize,
}

impl<'a> BusFrames<'a> {
    /// Wrap a host bus slice. Trailing samples that do not form a whole bus
    /// are ignored.
    pub fn new(frames: &'a mut [Sample], num_frames: usize) -> Self {
        let num_busses = if num_frames == 0 {
            0
        } else {
            frames.len() / num_frames
        };
        Self {
            frames,
            num_frames,
            num_busses,
        }
    }

    /// Number of frames in this block
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of complete busses in the slice
    #[inline]
    pub fn num_busses(&self) -> usize {
        self.num_busses
    }

    #[inline]
    fn offset(&self, bus: i32, frame: usize) -> Option<usize> {
        if bus < 1 || bus as usize > self.num_busses || frame >= self.num_frames {
            return None;
        }
        Some((bus as usize - 1) * self.num_frames + frame)
    }

    /// Read one frame of a bus (silence for "none" or unknown busses)
    #[inline]
    pub fn read(&self, bus: i32, frame: usize) -> Sample {
        self.offset(bus, frame).map_or(0.0, |i| self.frames[i])
    }

    /// Read one frame of a bus, or `None` when the bus is unassigned or
    /// missing. Used for CV inputs, where "no bus" disables modulation.
    #[inline]
    pub fn try_read(&self, bus: i32, frame: usize) -> Option<Sample> {
        self.offset(bus, frame).map(|i| self.frames[i])
    }

    /// Overwrite one frame of a bus
    #[inline]
    pub fn write(&mut self, bus: i32, frame: usize, value: Sample) {
        if let Some(i) = self.offset(bus, frame) {
            self.frames[i] = value;
        }
    }

    /// Add into one frame of a bus
    #[inline]
    pub fn accumulate(&mut self, bus: i32, frame: usize, value: Sample) {
        if let Some(i) = self.offset(bus, frame) {
            self.frames[i] += value;
        }
    }

    /// Borrow a whole bus as a slice, if it exists
    pub fn bus(&self, bus: i32) -> Option<&[Sample]> {
        let start = self.offset(bus, 0)?;
        Some(&self.frames[start..start + self.num_frames])
    }

    /// Mutably borrow a whole bus as a slice, if it exists
    pub fn bus_mut(&mut self, bus: i32) -> Option<&mut [Sample]> {
        let start = self.offset(bus, 0)?;
        let end = start + self.num_frames;
        Some(&mut self.frames[start..end])
    }
}
