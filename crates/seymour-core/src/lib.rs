//! Seymour Core - Multi-channel feedback mixer with a lookahead safety limiter
//!
//! Each channel mixes a live input with a delayed, DC-blocked copy of its own
//! output, pans the result into a stereo sum, and the sum passes through a
//! master level and a lookahead limiter before landing on two output busses.
//!
//! ```ignore
//! use seymour_core::{BusFrames, MixEngine, SharedParams};
//!
//! let mut engine = MixEngine::new(4, 48000.0);
//! let params = SharedParams::new(engine.layout());
//! let mut busses = BusFrames::new(&mut host_frames, block_size);
//! engine.process(&mut busses, &params);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod types;

pub use engine::MixEngine;
pub use error::{ParamError, ParamResult};
pub use params::{ParamSource, ParameterLayout, SharedParams};
pub use types::*;
