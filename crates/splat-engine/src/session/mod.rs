//! Frame orchestration.
//!
//! A [`RenderSession`] owns everything one splat cloud needs across frames:
//! view state, the sort scheduler, the packed attribute textures, telemetry
//! and the [`FrameLoop`] state machine. The platform drives it through a
//! [`FrameHost`] and it draws through a [`SplatBackend`].

mod backend;
mod host;
mod render_session;
mod state;

pub use backend::{CameraUniforms, DrawStatus, FrameBindings, SplatBackend};
pub use host::{FrameHost, TickHandle};
pub use render_session::{FrameError, RenderSession, SessionError, TickOutcome};
pub use state::{FrameLoop, LoopState, TickGate};
