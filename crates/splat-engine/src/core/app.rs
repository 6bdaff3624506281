use crate::input::InputEvent;

use super::ctx::{EventCtx, FrameCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime owns the window and the GPU; the app owns whatever it draws.
/// Frames are only delivered after the app asked for one through
/// [`EventCtx::host`] or [`FrameCtx::host`].
pub trait App {
    /// Called once the window and its GPU surface exist. An error here stops
    /// the runtime and is returned from [`crate::window::Runtime::run`].
    fn on_start(&mut self, ctx: &mut EventCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called for every translated input or lifecycle event.
    fn on_input(&mut self, ctx: &mut EventCtx<'_, '_>, event: &InputEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// Called for each delivered tick.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called when the window is closing. The surface is already reported
    /// as detached.
    fn on_close(&mut self, ctx: &mut EventCtx<'_, '_>) {
        let _ = ctx;
    }
}
