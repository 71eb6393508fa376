//! Render error types

use thiserror::Error;

/// Errors that can occur while rendering a file
#[derive(Error, Debug)]
pub enum RenderError {
    /// WAV file could not be read or written
    #[error("WAV I/O error: {0}")]
    Wav(#[from] hound::Error),

    /// More file channels than busses
    #[error("Input has {channels} channels, at most {max} busses are available")]
    TooManyChannels { channels: usize, max: usize },

    /// Input file has no channels
    #[error("Input has no audio channels")]
    NoChannels,

    /// Header claims a sample rate of zero
    #[error("Input sample rate is zero")]
    ZeroSampleRate,

    /// Sample format hound can decode but we do not handle
    #[error("Unsupported sample format: {bits}-bit {format}")]
    UnsupportedFormat { bits: u16, format: &'static str },

    /// Bus-to-file voltage scale must be positive and finite
    #[error("Invalid voltage scale: {0}")]
    InvalidScale(f32),
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::TooManyChannels { channels: 32, max: 28 };
        assert!(err.to_string().contains("32"));
        assert!(err.to_string().contains("28"));

        let err = RenderError::UnsupportedFormat { bits: 64, format: "float" };
        assert!(err.to_string().contains("64-bit float"));
    }
}
