use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, EventCtx, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::{InputEvent, InputState};
use crate::session::{FrameHost, TickHandle};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "splat".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    ///
    /// Window creation, GPU initialization and [`CoreApp::on_start`] failures
    /// end the loop and are returned here.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Tick bookkeeping for the window. A tick is a `RedrawRequested` that was
/// asked for and not cancelled since.
#[derive(Debug, Default)]
struct TickRequests {
    next_id: u64,
    pending: Option<TickHandle>,
    attached: bool,
}

/// [`FrameHost`] over a winit window's redraw requests.
struct WindowHost<'a> {
    window: &'a Window,
    ticks: &'a mut TickRequests,
}

impl FrameHost for WindowHost<'_> {
    fn request_tick(&mut self) -> TickHandle {
        self.ticks.next_id += 1;
        let handle = TickHandle::new(self.ticks.next_id);
        self.ticks.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        // winit cannot retract a redraw request; the stale one is dropped on arrival.
        if self.ticks.pending == Some(handle) {
            self.ticks.pending = None;
        }
    }

    fn surface_attached(&self) -> bool {
        self.ticks.attached
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    clock: FrameClock,
    ticks: TickRequests,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    suspended: bool,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            suspended: false,
            exit_requested: false,
            fatal: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.request_exit(event_loop);
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            input_state: InputState::default(),
            clock: FrameClock::new(),
            ticks: TickRequests {
                attached: true,
                ..TickRequests::default()
            },
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }

    /// Runs `f` with an [`EventCtx`] for the window, if it exists.
    fn with_event_ctx<R>(&mut self, f: impl FnOnce(&mut A, &mut EventCtx<'_, '_>) -> R) -> Option<R> {
        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, self.entry.as_mut()?);

        Some(entry.with_mut(|fields| {
            let window = fields.window;
            let mut host = WindowHost {
                window,
                ticks: fields.ticks,
            };
            let mut ctx = EventCtx {
                window: WindowCtx { id: window.id(), window },
                gpu: fields.gpu,
                host: &mut host,
            };
            f(app, &mut ctx)
        }))
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) {
        match self.create_window_entry(event_loop) {
            Ok(entry) => self.entry = Some(entry),
            Err(err) => return self.fail(event_loop, err),
        }

        if let Some(Err(err)) = self.with_event_ctx(|app, ctx| app.on_start(ctx)) {
            self.fail(event_loop, err.context("application failed to start"));
        }
    }

    fn dispatch_input(&mut self, event_loop: &ActiveEventLoop, event: &InputEvent) {
        let control = self.with_event_ctx(|app, ctx| app.on_input(ctx, event));
        if control == Some(AppControl::Exit) {
            self.request_exit(event_loop);
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(entry) = self.entry.as_mut() {
            entry.with_ticks_mut(|ticks| {
                ticks.attached = false;
                ticks.pending = None;
            });
        }
        self.with_event_ctx(|app, ctx| app.on_close(ctx));
        self.request_exit(event_loop);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (app, Some(entry)) = (&mut self.app, self.entry.as_mut()) else {
            return;
        };

        let control = entry.with_mut(|fields| {
            // Redraws nobody asked for (expose, resize) are not ticks.
            if fields.ticks.pending.take().is_none() {
                return AppControl::Continue;
            }

            let time = fields.clock.tick();
            let window = fields.window;
            let mut host = WindowHost {
                window,
                ticks: fields.ticks,
            };
            let mut ctx = FrameCtx {
                window: WindowCtx { id: window.id(), window },
                gpu: fields.gpu,
                host: &mut host,
                time,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            return;
        }

        if self.entry.is_none() {
            self.start(event_loop);
            return;
        }

        if self.suspended {
            self.suspended = false;
            self.dispatch_input(event_loop, &InputEvent::Visibility(true));
        }
    }

    fn suspended(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() && !self.suspended {
            self.suspended = true;
            self.dispatch_input(event_loop, &InputEvent::Visibility(false));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Ticks are driven by explicit redraw requests only.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        // The surface follows the window before the app hears about it.
        match &event {
            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
            }
            _ => {}
        }

        let input = entry.with_mut(|fields| {
            let ev = translate_window_event(fields.input_state, &event);
            if let Some(ev) = &ev {
                fields.input_state.apply_event(ev);
            }
            ev
        });

        if let Some(ev) = input {
            self.dispatch_input(event_loop, &ev);
            if self.exit_requested {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.close(event_loop),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
