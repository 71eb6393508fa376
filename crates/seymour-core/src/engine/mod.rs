//! Audio engine - channels, feedback delay, limiter, mix engine
//!
//! This module contains the real-time signal path:
//! - Channel: input + DC-blocked feedback tap, CV-modulated feedback and pan
//! - FeedbackDelayLine: one shared ring with a lane per channel
//! - LookaheadLimiter: delayed gain reduction with selectable saturation
//! - MixEngine: per-frame orchestration over host bus frames

mod channel;
mod coefficients;
mod dc_blocker;
mod feedback_delay;
mod limiter;
mod mixer;
mod modulation;
mod panner;
mod saturation;
mod smoother;

pub use channel::*;
pub use coefficients::*;
pub use dc_blocker::*;
pub use feedback_delay::*;
pub use limiter::*;
pub use mixer::*;
pub use modulation::*;
pub use panner::*;
pub use saturation::*;
pub use smoother::*;
