//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application drawing into its window. It avoids leaking runtime
//! internals into user code.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{EventCtx, FrameCtx, WindowCtx};
