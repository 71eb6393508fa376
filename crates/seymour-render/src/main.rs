//! Seymour Render - run audio files through the feedback mixer offline
//!
//! ## Usage
//!
//! ```text
//! seymour-render <input.wav> <output.wav> [--config mixer.yaml] [--volts 5.0]
//! seymour-render --write-config mixer.yaml
//! ```
//!
//! Input channel 1 lands on bus 1, channel 2 on bus 2 and so on. Without
//! `--config` the default mixer settings are used. `--volts` sets how many
//! bus volts WAV full scale corresponds to.
//!
//! Set `RUST_LOG=debug` for verbose output.

mod error;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use seymour_core::config::{read_config, save_config, MixerConfig};

/// Default bus volts for WAV full scale (±5 V audio)
const DEFAULT_VOLTS_PER_UNIT: f32 = 5.0;

const USAGE: &str = "usage:
  seymour-render <input.wav> <output.wav> [--config <mixer.yaml>] [--volts <v>]
  seymour-render --write-config <mixer.yaml>";

/// What the command line asked for
#[derive(Debug, PartialEq)]
enum Command {
    Render {
        input: PathBuf,
        output: PathBuf,
        config: Option<PathBuf>,
        volts_per_unit: f32,
    },
    WriteConfig(PathBuf),
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut volts_per_unit = DEFAULT_VOLTS_PER_UNIT;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--write-config" => {
                let path = iter.next().context("--write-config needs a path")?;
                return Ok(Command::WriteConfig(PathBuf::from(path)));
            }
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--volts" => {
                let value = iter.next().context("--volts needs a value")?;
                volts_per_unit = value
                    .parse()
                    .with_context(|| format!("Invalid --volts value: {}", value))?;
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}\n{}", flag, USAGE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    match <[PathBuf; 2]>::try_from(positional) {
        Ok([input, output]) => Ok(Command::Render {
            input,
            output,
            config,
            volts_per_unit,
        }),
        Err(_) => bail!("Expected an input and an output file\n{}", USAGE),
    }
}

fn main() -> Result<()> {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_args(&args)? {
        Command::Help => {
            println!("{}", USAGE);
        }
        Command::WriteConfig(path) => {
            save_config(&MixerConfig::default(), &path)?;
            println!("Wrote default mixer config to {}", path.display());
        }
        Command::Render {
            input,
            output,
            config,
            volts_per_unit,
        } => {
            let config: MixerConfig = match &config {
                Some(path) => read_config(path)?,
                None => {
                    log::info!("No --config given, using default mixer settings");
                    MixerConfig::default()
                }
            };

            let clip = render::read_wav(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let rendered = render::render(&clip, &config, volts_per_unit)?;
            render::write_stereo_wav(&output, clip.sample_rate(), &rendered.left, &rendered.right)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::debug!(
                "Output shifted by {} samples of lookahead",
                rendered.latency_samples
            );

            println!(
                "Rendered {} frames to {} (peak {:.2} V{})",
                rendered.left.len(),
                output.display(),
                rendered.peak_volts,
                if rendered.limited { ", limiter engaged" } else { "" }
            );
        }
    }

    Ok(())
}
