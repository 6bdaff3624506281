use thiserror::Error;

use crate::config::{ConfigError, SessionConfig};
use crate::input::{InputEvent, InputState, OrbitControls};
use crate::sort::{SortEngine, SortError, SortScheduler, SortStrategy, SortTick};
use crate::splat::{GroupLayout, ParticleAttributes, SetupError};
use crate::texture::{AttributeTextureSet, PermutationSet, TexturePacker};
use crate::time::{FpsSample, FpsStats};
use crate::view::{ViewController, ViewParameters, Viewport};

use super::backend::{CameraUniforms, DrawStatus, FrameBindings, SplatBackend};
use super::host::FrameHost;
use super::state::{FrameLoop, LoopState, TickGate};

/// Failures while building a session. Nothing has touched the GPU yet.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("sort pipeline setup failed: {0}")]
    Sort(#[from] SortError),
}

/// A frame that ran but could not draw. The loop stays scheduled.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Sort(#[from] SortError),

    #[error("no permutation has been computed yet")]
    NotSorted,

    #[error("draw failed: {0:#}")]
    Draw(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The loop is not running; nothing happened.
    Idle,
    Drawn {
        resorted: bool,
        /// Drawn with the previous order after a sort failure.
        stale: bool,
        /// `None` when the frame had the same timestamp as the last one.
        fps: Option<FpsSample>,
    },
    /// The frame ran but the backend had nothing to present. No FPS sample is
    /// recorded.
    Skipped { resorted: bool, stale: bool },
    /// The surface went away; no further ticks will be requested.
    Terminated,
}

/// One splat cloud being viewed, from load until its surface goes away.
pub struct RenderSession<E: SortEngine> {
    frame_loop: FrameLoop,
    controller: ViewController,
    controls: OrbitControls,
    input: InputState,
    params: ViewParameters,
    viewport: Viewport,
    pending_viewport: Option<Viewport>,
    layout: GroupLayout,
    scheduler: SortScheduler<E>,
    textures: AttributeTextureSet,
    fps: FpsStats,
    /// Set on resume so the hidden interval stays out of the FPS window.
    fps_rebase: bool,
    log_every_frames: u64,
    drawn_frames: u64,
}

impl<E: SortEngine> RenderSession<E> {
    /// Validates `config`, fits the group layout, runs the strategy's one-time
    /// reorder and packs the attribute textures.
    pub fn new(config: &SessionConfig, attributes: ParticleAttributes, mut engine: E) -> Result<Self, SessionError> {
        config.validate()?;

        let loaded = attributes.len();
        let layout = GroupLayout::fit(loaded, config.group_size)?;
        let prepared = config.strategy.prepare(&mut engine, attributes, layout)?;
        let textures = TexturePacker::pack(prepared.reordered);

        let scheduler = SortScheduler::new(
            engine,
            prepared.pipeline,
            layout,
            config.cadence(),
            config.sort_failure,
        );

        log::info!(
            "session: {} of {loaded} particles in {} groups of {}, {} sort every {} frame(s)",
            layout.particle_count(),
            layout.group_count(),
            layout.group_size(),
            config.strategy,
            config.sort_interval,
        );
        if layout.particle_count() < loaded {
            log::info!("session: dropping {} trailing particles", loaded - layout.particle_count());
        }

        Ok(Self {
            frame_loop: FrameLoop::new(),
            controller: ViewController::new(&config.view, config.projection),
            controls: OrbitControls,
            input: InputState::default(),
            params: config.view.initial_params(),
            viewport: Viewport::default(),
            pending_viewport: None,
            layout,
            scheduler,
            textures,
            fps: FpsStats::new(config.telemetry.max_frames),
            fps_rebase: false,
            log_every_frames: config.telemetry.log_every_frames,
            drawn_frames: 0,
        })
    }

    pub fn start(&mut self, host: &mut dyn FrameHost) -> bool {
        self.frame_loop.start(host)
    }

    pub fn set_visible(&mut self, visible: bool, host: &mut dyn FrameHost) -> bool {
        let changed = self.frame_loop.set_visible(visible, host);
        if changed && visible {
            self.fps_rebase = true;
        }
        changed
    }

    /// The surface was lost outside of a tick.
    pub fn detach(&mut self, host: &mut dyn FrameHost) {
        self.frame_loop.terminate(host);
    }

    /// Takes effect at the start of the next tick.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pending_viewport = Some(Viewport::new(width as f32, height as f32));
    }

    /// Routes lifecycle events to the loop and pointer events to the orbit
    /// camera. Returns `true` when the view changed.
    pub fn handle_input(&mut self, event: &InputEvent, host: &mut dyn FrameHost) -> bool {
        match event {
            InputEvent::Resized { width, height } => {
                self.resize(*width, *height);
                false
            }
            InputEvent::Visibility(visible) => {
                self.set_visible(*visible, host);
                false
            }
            _ => {
                let viewport = self.pending_viewport.unwrap_or(self.viewport);
                self.controls
                    .apply(event, &mut self.input, viewport, &self.controller, &mut self.params)
            }
        }
    }

    /// Runs one delivered tick at host timestamp `now_ms`.
    ///
    /// A frame that fails to sort or draw still requests the next tick before
    /// the error is returned.
    pub fn tick(
        &mut self,
        now_ms: f64,
        host: &mut dyn FrameHost,
        backend: &mut dyn SplatBackend,
    ) -> Result<TickOutcome, FrameError> {
        let frame_index = match self.frame_loop.begin_tick(host) {
            TickGate::Idle => return Ok(TickOutcome::Idle),
            TickGate::Terminated => return Ok(TickOutcome::Terminated),
            TickGate::Run { frame_index } => frame_index,
        };

        let result = self.run_frame(frame_index, now_ms, backend);
        self.frame_loop.end_tick(host);

        if let Err(err) = &result {
            log::error!("frame {frame_index}: {err}");
        }
        result
    }

    fn run_frame(
        &mut self,
        frame_index: u64,
        now_ms: f64,
        backend: &mut dyn SplatBackend,
    ) -> Result<TickOutcome, FrameError> {
        if let Some(viewport) = self.pending_viewport.take() {
            self.viewport = viewport;
        }
        let camera = self.controller.compute_transform(self.viewport, &mut self.params);
        let eye = self.params.eye_position;

        let sort = self.scheduler.permutation_for(frame_index, &camera, eye)?;
        let permutations = self.scheduler.current().ok_or(FrameError::NotSorted)?;

        let bindings = FrameBindings {
            camera: CameraUniforms::new(&camera, eye, self.viewport, self.layout),
            strategy: self.scheduler.strategy(),
            attributes: &self.textures,
            permutations,
            instance_count: self.layout.particle_count() as u32,
            frame_index,
        };
        let status = backend.draw(&bindings).map_err(FrameError::Draw)?;

        let resorted = sort == SortTick::Resorted;
        let stale = matches!(sort, SortTick::Stale(_));
        if status == DrawStatus::Skipped {
            log::trace!("frame {frame_index}: nothing presented");
            return Ok(TickOutcome::Skipped { resorted, stale });
        }

        let fps = if std::mem::take(&mut self.fps_rebase) {
            self.fps.rebase(now_ms);
            None
        } else {
            self.fps.record_frame(now_ms)
        };
        self.drawn_frames += 1;
        if self.log_every_frames > 0 && self.drawn_frames % self.log_every_frames == 0 {
            log::info!(
                "frame {frame_index}: {:.1} fps (avg {:.1} over {} frames)",
                fps.map_or(0.0, |s| s.fps),
                self.fps.average(),
                self.fps.num_frames()
            );
        }

        Ok(TickOutcome::Drawn { resorted, stale, fps })
    }

    pub fn state(&self) -> LoopState {
        self.frame_loop.state()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_loop.frame_index()
    }

    pub fn layout(&self) -> GroupLayout {
        self.layout
    }

    pub fn strategy(&self) -> SortStrategy {
        self.scheduler.strategy()
    }

    pub fn params(&self) -> &ViewParameters {
        &self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn fps(&self) -> &FpsStats {
        &self.fps
    }

    pub fn attribute_textures(&self) -> &AttributeTextureSet {
        &self.textures
    }

    pub fn permutations(&self) -> Option<&PermutationSet> {
        self.scheduler.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TickHandle;
    use crate::sort::CpuSortEngine;

    #[derive(Default)]
    struct Host {
        next: u64,
        outstanding: Option<TickHandle>,
        detached: bool,
    }

    impl FrameHost for Host {
        fn request_tick(&mut self) -> TickHandle {
            self.next += 1;
            let h = TickHandle::new(self.next);
            self.outstanding = Some(h);
            h
        }

        fn cancel_tick(&mut self, handle: TickHandle) {
            if self.outstanding == Some(handle) {
                self.outstanding = None;
            }
        }

        fn surface_attached(&self) -> bool {
            !self.detached
        }
    }

    #[derive(Default)]
    struct Recorder {
        instances: Vec<u32>,
        fail: bool,
        minimized: bool,
    }

    impl SplatBackend for Recorder {
        fn draw(&mut self, bindings: &FrameBindings<'_>) -> anyhow::Result<DrawStatus> {
            anyhow::ensure!(!self.fail, "device lost");
            if self.minimized {
                return Ok(DrawStatus::Skipped);
            }
            self.instances.push(bindings.instance_count);
            Ok(DrawStatus::Presented)
        }
    }

    fn cloud(n: usize) -> ParticleAttributes {
        let positions = (0..n)
            .map(|i| {
                let t = i as f32 * 0.37;
                [t.sin(), (t * 1.3).cos(), (t * 0.7).sin()]
            })
            .collect();
        ParticleAttributes::new(positions, vec![[1.0; 4]; n], vec![[0.01; 3]; n], vec![[0.0; 3]; n]).unwrap()
    }

    fn config(group_size: u32) -> SessionConfig {
        SessionConfig {
            group_size,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn too_few_particles_is_a_setup_error() {
        let err = RenderSession::new(&config(1024), cloud(1000), CpuSortEngine::new());
        assert!(matches!(
            err,
            Err(SessionError::Setup(SetupError::NotEnoughParticles { .. }))
        ));
    }

    #[test]
    fn ticks_before_start_are_idle() {
        let mut session = RenderSession::new(&config(16), cloud(64), CpuSortEngine::new()).unwrap();
        let (mut host, mut backend) = (Host::default(), Recorder::default());
        assert_eq!(session.tick(16.0, &mut host, &mut backend).unwrap(), TickOutcome::Idle);
        assert!(backend.instances.is_empty());
    }

    #[test]
    fn running_tick_draws_all_instances_and_reschedules() {
        let mut session = RenderSession::new(&config(16), cloud(70), CpuSortEngine::new()).unwrap();
        let (mut host, mut backend) = (Host::default(), Recorder::default());
        session.start(&mut host);

        let outcome = session.tick(16.0, &mut host, &mut backend).unwrap();
        assert!(matches!(outcome, TickOutcome::Drawn { resorted: true, .. }));
        assert_eq!(backend.instances, vec![64]);
        assert!(host.outstanding.is_some());
        assert_eq!(session.frame_index(), 1);
    }

    #[test]
    fn draw_failure_still_reschedules() {
        let mut session = RenderSession::new(&config(16), cloud(64), CpuSortEngine::new()).unwrap();
        let mut host = Host::default();
        let mut backend = Recorder {
            fail: true,
            ..Default::default()
        };
        session.start(&mut host);
        host.outstanding = None;

        assert!(matches!(session.tick(16.0, &mut host, &mut backend), Err(FrameError::Draw(_))));
        assert!(host.outstanding.is_some());
        assert_eq!(session.frame_index(), 1);
        assert_eq!(session.fps().num_frames(), 0);
    }

    #[test]
    fn skipped_draw_records_no_fps_and_reschedules() {
        let mut session = RenderSession::new(&config(16), cloud(64), CpuSortEngine::new()).unwrap();
        let mut host = Host::default();
        let mut backend = Recorder {
            minimized: true,
            ..Default::default()
        };
        session.start(&mut host);
        host.outstanding = None;

        let outcome = session.tick(16.0, &mut host, &mut backend).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Skipped {
                resorted: true,
                stale: false
            }
        );
        assert!(host.outstanding.is_some());
        assert_eq!(session.frame_index(), 1);
        assert_eq!(session.fps().num_frames(), 0);

        backend.minimized = false;
        let outcome = session.tick(32.0, &mut host, &mut backend).unwrap();
        let TickOutcome::Drawn { fps: Some(sample), .. } = outcome else {
            panic!("expected a drawn frame with a sample, got {outcome:?}");
        };
        assert!((sample.fps - 1000.0 / 32.0).abs() < 1e-9);
        assert_eq!(backend.instances, vec![64]);
    }

    #[test]
    fn resume_keeps_the_hidden_interval_out_of_fps() {
        let mut session = RenderSession::new(&config(16), cloud(64), CpuSortEngine::new()).unwrap();
        let (mut host, mut backend) = (Host::default(), Recorder::default());
        session.start(&mut host);
        session.tick(16.0, &mut host, &mut backend).unwrap();
        session.tick(32.0, &mut host, &mut backend).unwrap();
        assert_eq!(session.fps().num_frames(), 2);

        session.set_visible(false, &mut host);
        assert!(session.set_visible(true, &mut host));

        // The first frame back only sets the baseline.
        let outcome = session.tick(60_000.0, &mut host, &mut backend).unwrap();
        assert!(matches!(outcome, TickOutcome::Drawn { fps: None, .. }));
        assert_eq!(session.fps().num_frames(), 2);

        let outcome = session.tick(60_016.0, &mut host, &mut backend).unwrap();
        let TickOutcome::Drawn { fps: Some(sample), .. } = outcome else {
            panic!("expected a drawn frame with a sample, got {outcome:?}");
        };
        assert!((sample.fps - 62.5).abs() < 1e-9);
        assert!(session.fps().samples().iter().all(|&fps| fps > 1.0));
    }

    #[test]
    fn resize_applies_on_next_tick() {
        let mut session = RenderSession::new(&config(16), cloud(64), CpuSortEngine::new()).unwrap();
        let (mut host, mut backend) = (Host::default(), Recorder::default());
        session.start(&mut host);
        session.handle_input(&InputEvent::Resized { width: 640, height: 480 }, &mut host);
        assert_eq!(session.viewport(), Viewport::default());
        session.tick(16.0, &mut host, &mut backend).unwrap();
        assert_eq!(session.viewport(), Viewport::new(640.0, 480.0));
    }

    #[test]
    fn visibility_event_suspends_the_loop() {
        let mut session = RenderSession::new(&config(16), cloud(64), CpuSortEngine::new()).unwrap();
        let (mut host, mut backend) = (Host::default(), Recorder::default());
        session.start(&mut host);
        session.handle_input(&InputEvent::Visibility(false), &mut host);
        assert_eq!(session.state(), LoopState::Suspended);
        assert!(host.outstanding.is_none());
        assert_eq!(session.tick(16.0, &mut host, &mut backend).unwrap(), TickOutcome::Idle);
    }
}
