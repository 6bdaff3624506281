//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, wires them to the GPU layer and
//! turns redraw requests into frame ticks.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
