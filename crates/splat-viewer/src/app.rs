use anyhow::Result;

use splat_engine::core::{App, AppControl, EventCtx, FrameCtx, WindowCtx};
use splat_engine::input::InputEvent;
use splat_engine::render::SplatRenderer;
use splat_engine::session::{RenderSession, TickOutcome};
use splat_engine::sort::CpuSortEngine;
use splat_engine::time::FpsSample;

const TITLE_INTERVAL_MS: f64 = 500.0;

/// Viewer application: one session, one renderer, FPS in the title bar.
pub struct ViewerApp {
    session: RenderSession<CpuSortEngine>,
    renderer: Option<SplatRenderer>,
    title: String,
    last_title_ms: f64,
}

impl ViewerApp {
    pub fn new(session: RenderSession<CpuSortEngine>, title: String) -> Self {
        Self {
            session,
            renderer: None,
            title,
            last_title_ms: f64::NEG_INFINITY,
        }
    }

    fn update_title(&mut self, window: &WindowCtx<'_>, sample: FpsSample, now_ms: f64) {
        if now_ms - self.last_title_ms < TITLE_INTERVAL_MS {
            return;
        }
        self.last_title_ms = now_ms;
        window.set_title(&format!(
            "{} | {:.1} fps (avg {:.1}) | {} sort",
            self.title,
            sample.fps,
            sample.average,
            self.session.strategy()
        ));
    }
}

impl App for ViewerApp {
    fn on_start(&mut self, ctx: &mut EventCtx<'_, '_>) -> Result<()> {
        ctx.gpu.check_capabilities(self.session.layout())?;

        let renderer = SplatRenderer::new(ctx.gpu.device(), ctx.gpu.surface_format(), self.session.strategy());
        self.renderer = Some(renderer);

        let size = ctx.gpu.size();
        self.session.resize(size.width, size.height);
        self.session.start(ctx.host);
        Ok(())
    }

    fn on_input(&mut self, ctx: &mut EventCtx<'_, '_>, event: &InputEvent) -> AppControl {
        self.session.handle_input(event, ctx.host);
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Continue;
        };

        let now_ms = ctx.time.timestamp_ms;
        let outcome = {
            let mut surface = renderer.surface(ctx.gpu);
            self.session.tick(now_ms, ctx.host, &mut surface)
        };

        if renderer.surface_lost() {
            log::error!("surface lost, shutting down");
            self.session.detach(ctx.host);
            return AppControl::Exit;
        }

        match outcome {
            Ok(TickOutcome::Drawn { fps: Some(sample), .. }) => self.update_title(&ctx.window, sample, now_ms),
            Ok(TickOutcome::Terminated) => return AppControl::Exit,
            // Frame errors are logged by the session and the next tick is already queued.
            Ok(_) | Err(_) => {}
        }

        AppControl::Continue
    }

    fn on_close(&mut self, ctx: &mut EventCtx<'_, '_>) {
        self.session.detach(ctx.host);
        log::info!("closed after {} frames", self.session.frame_index());
    }
}
