//! Splat engine crate.
//!
//! Drives a host-scheduled frame loop that keeps a Gaussian splat cloud
//! sorted back-to-front and draws it with alpha blending:
//!
//! - [`splat`] and [`texture`] turn per-particle arrays into GPU-ready grids.
//! - [`sort`] owns the sort strategies and the cadence at which they rerun.
//! - [`session`] ties view, sorting, telemetry and the loop state machine
//!   together behind the [`session::FrameHost`] and
//!   [`session::SplatBackend`] seams.
//! - [`device`], [`render`] and [`window`] are the wgpu/winit side.

pub mod config;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod session;
pub mod sort;
pub mod splat;
pub mod texture;
pub mod time;
pub mod view;
pub mod window;
