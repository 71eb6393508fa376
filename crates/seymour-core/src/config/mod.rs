//! Configuration for Seymour hosts
//!
//! - Generic YAML config loading/saving
//! - [`MixerConfig`]: a file-friendly description of every mixer parameter
//!
//! # Usage
//!
//! ```ignore
//! use seymour_core::config::{load_config, MixerConfig};
//! use seymour_core::params::ParameterLayout;
//!
//! let config: MixerConfig = load_config(&path);
//! let layout = ParameterLayout::new(config.num_channels());
//! let raw = config.raw_values(&layout);
//! ```

mod io;
mod mixer;

pub use io::{load_config, read_config, save_config};
pub use mixer::{ChannelSettings, MixerConfig, OutputMode};
