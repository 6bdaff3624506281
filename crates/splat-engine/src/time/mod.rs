//! Time subsystem.
//!
//! - `FrameClock` turns the monotonic clock into per-tick timestamps the
//!   frame loop and telemetry consume (milliseconds since the clock started).
//! - `FpsStats` keeps a fixed window of instantaneous FPS samples and a
//!   running average.

mod fps;
mod frame_clock;

pub use fps::{FpsSample, FpsStats, DEFAULT_MAX_FRAMES};
pub use frame_clock::{FrameClock, FrameTime};
