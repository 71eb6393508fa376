//! Shared feedback delay line
//!
//! One ring buffer holds a lane per mixer channel, interleaved frame by frame
//! (`frame * MAX_CHANNELS + channel`). All lanes share a single write cursor
//! that advances once per frame after every channel has written, so a single
//! delay length applies to the whole mixer.

use crate::types::{MAX_CHANNELS, MAX_FEEDBACK_DELAY_SAMPLES};

/// Multi-lane ring buffer decoupling feedback write and read by a fixed delay
pub struct FeedbackDelayLine {
    /// Interleaved lanes, `size * MAX_CHANNELS` samples
    buffer: Box<[f32]>,
    /// Ring length in frames
    size: usize,
    /// Shared write cursor (frame index)
    write_pos: usize,
    /// Delay between write and read, always in `[1, size - 1]`
    delay_samples: usize,
}

impl FeedbackDelayLine {
    /// Create a delay line sized for the longest supported delay
    pub fn new() -> Self {
        Self::with_size(MAX_FEEDBACK_DELAY_SAMPLES)
    }

    /// Create a delay line with a ring of `size` frames (at least 2)
    pub fn with_size(size: usize) -> Self {
        let size = size.max(2);
        Self {
            buffer: vec![0.0; size * MAX_CHANNELS].into_boxed_slice(),
            size,
            write_pos: 0,
            delay_samples: 1,
        }
    }

    /// Ring length in frames
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current delay in frames
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Set the delay, clamped into `[1, size - 1]`. Returns the stored value.
    pub fn set_delay_samples(&mut self, samples: usize) -> usize {
        self.delay_samples = samples.clamp(1, self.size - 1);
        self.delay_samples
    }

    /// Frame index the feedback taps are read from for the current frame
    #[inline]
    pub fn read_pos(&self) -> usize {
        (self.write_pos + self.size - self.delay_samples) % self.size
    }

    /// Read one channel's tap at `read_pos`
    #[inline]
    pub fn tap(&self, read_pos: usize, channel: usize) -> f32 {
        self.buffer[read_pos * MAX_CHANNELS + channel]
    }

    /// Write one channel's sample at the current write cursor
    #[inline]
    pub fn write(&mut self, channel: usize, value: f32) {
        self.buffer[self.write_pos * MAX_CHANNELS + channel] = value;
    }

    /// Advance the shared write cursor by one frame
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos = (self.write_pos + 1) % self.size;
    }

    /// Clear all lanes and rewind the cursor
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for FeedbackDelayLine {
    fn default() -> Self {
        Self::new()
    }
}
