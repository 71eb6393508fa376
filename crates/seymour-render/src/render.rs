//! Offline rendering of WAV files through the mix engine
//!
//! File channel `k` is placed on bus `k + 1`, scaled from WAV full scale to
//! volts. The engine runs in blocks of the configured size, and the output
//! busses are read back and written as a stereo 32-bit float WAV.
//!
//! The limiter's lookahead delays the output; rendering runs that many extra
//! frames of silence and drops the same number from the front so the result
//! lines up with the input sample for sample.

use std::path::Path;
use std::sync::atomic::Ordering;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use seymour_core::config::MixerConfig;
use seymour_core::engine::MixEngine;
use seymour_core::params::GlobalParam;
use seymour_core::{BusFrames, NUM_BUSSES};

use crate::error::{RenderError, RenderResult};

/// Decoded audio, one vector per channel, normalized to ±1.0 full scale
#[derive(Debug, Clone)]
pub struct AudioClip {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioClip {
    /// Wrap planar channel data, checking it fits on the bus bank
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> RenderResult<Self> {
        if sample_rate == 0 {
            return Err(RenderError::ZeroSampleRate);
        }
        if channels.is_empty() {
            return Err(RenderError::NoChannels);
        }
        if channels.len() > NUM_BUSSES {
            return Err(RenderError::TooManyChannels {
                channels: channels.len(),
                max: NUM_BUSSES,
            });
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Length in frames (the longest channel)
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Read a WAV file into planar channels
pub fn read_wav(path: &Path) -> RenderResult<AudioClip> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    log::info!(
        "read_wav: {:?}: {} ch, {} Hz, {}-bit {:?}",
        path,
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
        (SampleFormat::Float, bits) => {
            return Err(RenderError::UnsupportedFormat {
                bits,
                format: "float",
            })
        }
        (SampleFormat::Int, bits) => {
            return Err(RenderError::UnsupportedFormat {
                bits,
                format: "integer",
            })
        }
    };

    let num_channels = usize::from(spec.channels).max(1);
    let frames = interleaved.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(frames); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    AudioClip::new(spec.sample_rate, channels)
}

/// Write left/right as a stereo 32-bit float WAV
pub fn write_stereo_wav(
    path: &Path,
    sample_rate: u32,
    left: &[f32],
    right: &[f32],
) -> RenderResult<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for (&l, &r) in left.iter().zip(right) {
        writer.write_sample(l)?;
        writer.write_sample(r)?;
    }
    writer.finalize()?;

    log::info!("write_stereo_wav: wrote {} frames to {:?}", left.len(), path);
    Ok(())
}

/// Rendered stereo output plus a few facts about the run
#[derive(Debug, Clone)]
pub struct Rendered {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    /// Lookahead that was compensated, in samples
    pub latency_samples: usize,
    /// Largest absolute output value, in volts
    pub peak_volts: f32,
    /// Whether the limiter engaged at any point
    pub limited: bool,
}

/// Run `clip` through a mix engine built from `config`.
///
/// `volts_per_unit` maps WAV full scale onto bus volts on the way in, and
/// back again on the way out.
pub fn render(clip: &AudioClip, config: &MixerConfig, volts_per_unit: f32) -> RenderResult<Rendered> {
    if !(volts_per_unit.is_finite() && volts_per_unit > 0.0) {
        return Err(RenderError::InvalidScale(volts_per_unit));
    }
    if config.sample_rate != clip.sample_rate() {
        log::warn!(
            "render: config sample rate {} Hz ignored, rendering at file rate {} Hz",
            config.sample_rate,
            clip.sample_rate()
        );
    }

    let sample_rate = clip.sample_rate() as f32;
    let mut engine = MixEngine::new(config.num_channels(), sample_rate);
    let layout = engine.layout().clone();
    let params = config.raw_values(&layout);
    engine.set_sample_rate(sample_rate, params.as_slice());

    let output_left = params[layout.global_param(GlobalParam::OutputL)];
    let output_right = params[layout.global_param(GlobalParam::OutputR)];
    let indicator = engine.limit_indicator();

    let frames = clip.frames();
    let latency = engine.latency_samples();
    let total = frames + latency;
    let block_size = config.block_size.max(1);

    log::info!(
        "render: {} frames, {} channels on {} busses, block {} frames, lookahead {} samples",
        frames,
        layout.num_channels(),
        clip.num_channels(),
        block_size,
        latency
    );

    let mut bus_data = vec![0.0f32; NUM_BUSSES * block_size];
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    let mut peak_volts = 0.0f32;
    let mut limited = false;

    let mut start = 0;
    while start < total {
        let n = block_size.min(total - start);
        let block = &mut bus_data[..NUM_BUSSES * n];
        block.fill(0.0);

        for (k, channel) in clip.channels.iter().enumerate() {
            let bus = &mut block[k * n..(k + 1) * n];
            for (i, dst) in bus.iter_mut().enumerate() {
                *dst = channel.get(start + i).copied().unwrap_or(0.0) * volts_per_unit;
            }
        }

        let mut busses = BusFrames::new(block, n);
        engine.process(&mut busses, params.as_slice());

        for i in 0..n {
            let l = busses.read(output_left, i);
            let r = busses.read(output_right, i);
            peak_volts = peak_volts.max(l.abs()).max(r.abs());
            if start + i >= latency {
                left.push(l / volts_per_unit);
                right.push(r / volts_per_unit);
            }
        }

        limited |= indicator.swap(false, Ordering::Relaxed);
        start += n;
    }

    log::info!(
        "render: peak {:.3} V, limiter {}",
        peak_volts,
        if limited { "engaged" } else { "idle" }
    );

    Ok(Rendered {
        left,
        right,
        latency_samples: latency,
        peak_volts,
        limited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 48000;

    fn impulse_clip(frames: usize, at: usize, value: f32) -> AudioClip {
        let mut data = vec![0.0; frames];
        data[at] = value;
        AudioClip::new(SR, vec![data]).unwrap()
    }

    #[test]
    fn test_clip_validation() {
        assert!(matches!(
            AudioClip::new(0, vec![vec![0.0]]),
            Err(RenderError::ZeroSampleRate)
        ));
        assert!(matches!(AudioClip::new(SR, vec![]), Err(RenderError::NoChannels)));
        assert!(matches!(
            AudioClip::new(SR, vec![vec![0.0]; NUM_BUSSES + 1]),
            Err(RenderError::TooManyChannels { channels: 29, max: 28 })
        ));
        let clip = AudioClip::new(SR, vec![vec![0.0; 10], vec![0.0; 12]]).unwrap();
        assert_eq!(clip.frames(), 12);
        assert_eq!(clip.num_channels(), 2);
    }

    #[test]
    fn test_render_is_latency_compensated() {
        let mut config = MixerConfig::default();
        config.channels[0].pan = -100;
        config.block_size = 100;

        let clip = impulse_clip(4000, 3000, 0.5);
        let out = render(&clip, &config, 5.0).unwrap();

        assert_eq!(out.left.len(), 4000);
        assert_eq!(out.right.len(), 4000);
        assert_eq!(out.latency_samples, 240);
        assert!((out.left[3000] - 0.5).abs() < 1e-2, "left = {}", out.left[3000]);
        assert!(out.left[2999].abs() < 1e-6);
        assert!(out.left[3001].abs() < 1e-6);
        assert!(!out.limited);
    }

    #[test]
    fn test_render_silence() {
        let clip = AudioClip::new(SR, vec![vec![0.0; 1000], vec![0.0; 1000]]).unwrap();
        let out = render(&clip, &MixerConfig::default(), 5.0).unwrap();
        assert!(out.left.iter().chain(&out.right).all(|&s| s == 0.0));
        assert_eq!(out.peak_volts, 0.0);
    }

    #[test]
    fn test_render_reports_limiting() {
        let mut config = MixerConfig::default();
        config.squash_percent = 100.0;
        let clip = AudioClip::new(SR, vec![vec![0.9; 9600], vec![0.9; 9600]]).unwrap();
        let out = render(&clip, &config, 5.0).unwrap();
        assert!(out.limited);
        assert!(out.left.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_invalid_scale() {
        let clip = impulse_clip(10, 0, 1.0);
        assert!(matches!(
            render(&clip, &MixerConfig::default(), 0.0),
            Err(RenderError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let left: Vec<f32> = (0..64).map(|i| i as f32 / 64.0).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        write_stereo_wav(&path, SR, &left, &right).unwrap();

        let clip = read_wav(&path).unwrap();
        assert_eq!(clip.sample_rate(), SR);
        assert_eq!(clip.num_channels(), 2);
        assert_eq!(clip.channels[0], left);
        assert_eq!(clip.channels[1], right);
    }

    #[test]
    fn test_read_16_bit_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono16.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(16384i16).unwrap();
        writer.write_sample(-32768i16).unwrap();
        writer.finalize().unwrap();

        let clip = read_wav(&path).unwrap();
        assert_eq!(clip.channels[0], vec![0.5, -1.0]);
    }
}
