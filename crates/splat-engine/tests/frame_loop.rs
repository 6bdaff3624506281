use std::cell::Cell;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use splat_engine::config::SessionConfig;
use splat_engine::input::{
    InputEvent, MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent, PointerMoveEvent,
};
use splat_engine::session::{
    DrawStatus, FrameBindings, FrameError, FrameHost, LoopState, RenderSession, SplatBackend, TickHandle,
    TickOutcome,
};
use splat_engine::sort::{CpuFullPipeline, CpuGroupedPipeline, CpuSortEngine, SortEngine, SortError, SortStrategy};
use splat_engine::splat::{GroupLayout, ParticleAttributes};
use splat_engine::texture::PermutationTexture;

#[derive(Default)]
struct Host {
    next: u64,
    outstanding: Option<TickHandle>,
    requests: usize,
    detached: bool,
}

impl FrameHost for Host {
    fn request_tick(&mut self) -> TickHandle {
        assert!(self.outstanding.is_none(), "a second tick was requested while one is pending");
        self.next += 1;
        self.requests += 1;
        let handle = TickHandle::new(self.next);
        self.outstanding = Some(handle);
        handle
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

impl Host {
    /// Delivers the pending tick, if any, the way a display callback would.
    fn deliver(&mut self) -> bool {
        self.outstanding.take().is_some()
    }
}

#[derive(Default)]
struct Backend {
    generations: Vec<u64>,
    draw_orders: Vec<Vec<u32>>,
    fail_next: bool,
}

impl SplatBackend for Backend {
    fn draw(&mut self, bindings: &FrameBindings<'_>) -> anyhow::Result<DrawStatus> {
        if std::mem::take(&mut self.fail_next) {
            anyhow::bail!("lost device");
        }
        let layout = bindings.attributes.layout();
        self.generations.push(bindings.permutations.generation());
        self.draw_orders.push(bindings.permutations.draw_order(layout).unwrap_or_default());
        Ok(DrawStatus::Presented)
    }
}

/// CPU engine whose per-frame sorts fail while `failures` is non-zero.
struct FlakyEngine {
    inner: CpuSortEngine,
    failures: Rc<Cell<u32>>,
}

impl FlakyEngine {
    fn check(&self) -> Result<(), SortError> {
        let left = self.failures.get();
        if left == 0 {
            return Ok(());
        }
        self.failures.set(left - 1);
        Err(SortError::Engine("readback timed out".into()))
    }
}

impl SortEngine for FlakyEngine {
    type FullPipeline = CpuFullPipeline;
    type GroupedPipeline = CpuGroupedPipeline;

    fn create_full(&mut self, positions: &[[f32; 3]], layout: GroupLayout) -> Result<CpuFullPipeline, SortError> {
        self.inner.create_full(positions, layout)
    }

    fn apply_full(&mut self, pipeline: &mut CpuFullPipeline, view_proj: Mat4) -> Result<PermutationTexture, SortError> {
        self.check()?;
        self.inner.apply_full(pipeline, view_proj)
    }

    fn create_grouped(
        &mut self,
        positions: &[[f32; 3]],
        layout: GroupLayout,
    ) -> Result<(CpuGroupedPipeline, Vec<u32>), SortError> {
        self.inner.create_grouped(positions, layout)
    }

    fn apply_grouped(
        &mut self,
        pipeline: &mut CpuGroupedPipeline,
        eye: Vec3,
        view_proj: Mat4,
    ) -> Result<(PermutationTexture, PermutationTexture), SortError> {
        self.check()?;
        self.inner.apply_grouped(pipeline, eye, view_proj)
    }
}

fn ring(n: usize) -> ParticleAttributes {
    let positions = (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            [a.cos() * 2.0, (i % 7) as f32 * 0.1 - 0.3, a.sin() * 2.0]
        })
        .collect();
    ParticleAttributes::new(positions, vec![[0.8, 0.4, 0.2, 0.5]; n], vec![[0.02; 3]; n], vec![[0.0; 3]; n])
        .unwrap()
}

fn session(strategy: SortStrategy, sort_interval: u32, particles: usize) -> RenderSession<CpuSortEngine> {
    let config = SessionConfig {
        group_size: 32,
        strategy,
        sort_interval,
        ..SessionConfig::default()
    };
    RenderSession::new(&config, ring(particles), CpuSortEngine::new()).unwrap()
}

/// Runs `frames` delivered ticks, 16 ms apart, starting at `t0`.
fn run(
    session: &mut RenderSession<CpuSortEngine>,
    host: &mut Host,
    backend: &mut Backend,
    t0: f64,
    frames: usize,
) -> Vec<TickOutcome> {
    let mut outcomes = Vec::new();
    for i in 0..frames {
        assert!(host.deliver(), "no tick pending before frame {i}");
        outcomes.push(session.tick(t0 + 16.0 * i as f64, host, backend).unwrap());
    }
    outcomes
}

fn is_bijection(order: &[u32], n: usize) -> bool {
    let mut sorted = order.to_vec();
    sorted.sort_unstable();
    sorted.len() == n && sorted.iter().enumerate().all(|(i, &v)| v as usize == i)
}

#[test]
fn cadence_resorts_every_k_frames() {
    let mut session = session(SortStrategy::Full, 3, 128);
    let (mut host, mut backend) = (Host::default(), Backend::default());
    assert!(session.start(&mut host));

    let outcomes = run(&mut session, &mut host, &mut backend, 16.0, 7);

    assert_eq!(backend.generations, vec![1, 1, 1, 2, 2, 2, 3]);
    let resorted: Vec<bool> = outcomes
        .iter()
        .map(|o| matches!(o, TickOutcome::Drawn { resorted: true, .. }))
        .collect();
    assert_eq!(resorted, vec![true, false, false, true, false, false, true]);
    assert_eq!(session.frame_index(), 7);
}

#[test]
fn every_drawn_order_is_a_bijection() {
    for strategy in [SortStrategy::Full, SortStrategy::Grouped] {
        let mut session = session(strategy, 1, 100);
        let (mut host, mut backend) = (Host::default(), Backend::default());
        session.start(&mut host);

        run(&mut session, &mut host, &mut backend, 16.0, 2);
        // Orbit a little so the second pass sorts from a different eye.
        session.handle_input(
            &InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 10.0,
                y: 10.0,
            }),
            &mut host,
        );
        session.handle_input(&InputEvent::PointerMoved(PointerMoveEvent { x: 10.0, y: 10.0 }), &mut host);
        session.handle_input(&InputEvent::PointerMoved(PointerMoveEvent { x: 400.0, y: 60.0 }), &mut host);
        run(&mut session, &mut host, &mut backend, 48.0, 2);

        // 100 particles in groups of 32: three groups are drawn.
        assert_eq!(session.layout().particle_count(), 96);
        for order in &backend.draw_orders {
            assert!(is_bijection(order, 96), "{strategy}: {order:?}");
        }
    }
}

#[test]
fn suspend_and_resume_keep_one_tick_in_flight() {
    let mut session = session(SortStrategy::Full, 1, 64);
    let (mut host, mut backend) = (Host::default(), Backend::default());
    session.start(&mut host);
    run(&mut session, &mut host, &mut backend, 16.0, 2);

    session.handle_input(&InputEvent::Visibility(false), &mut host);
    assert_eq!(session.state(), LoopState::Suspended);
    assert!(host.outstanding.is_none());

    // Hiding twice changes nothing.
    assert!(!session.set_visible(false, &mut host));

    let requests = host.requests;
    session.handle_input(&InputEvent::Visibility(true), &mut host);
    assert_eq!(session.state(), LoopState::Running);
    assert_eq!(host.requests, requests + 1);

    run(&mut session, &mut host, &mut backend, 1000.0, 1);
    assert_eq!(session.frame_index(), 3);
}

#[test]
fn detached_surface_terminates_on_next_tick() {
    let mut session = session(SortStrategy::Full, 1, 64);
    let (mut host, mut backend) = (Host::default(), Backend::default());
    session.start(&mut host);
    run(&mut session, &mut host, &mut backend, 16.0, 1);

    host.detached = true;
    assert!(host.deliver());
    assert_eq!(session.tick(32.0, &mut host, &mut backend).unwrap(), TickOutcome::Terminated);
    assert_eq!(session.state(), LoopState::Terminated);
    assert!(host.outstanding.is_none());

    // Terminated is final.
    assert!(!session.start(&mut host));
    assert!(!session.set_visible(true, &mut host));
    assert_eq!(session.tick(48.0, &mut host, &mut backend).unwrap(), TickOutcome::Idle);
    assert_eq!(backend.generations.len(), 1);
}

#[test]
fn failed_frame_is_rescheduled_and_the_loop_recovers() {
    let mut session = session(SortStrategy::Grouped, 1, 64);
    let (mut host, mut backend) = (Host::default(), Backend::default());
    session.start(&mut host);

    backend.fail_next = true;
    assert!(host.deliver());
    assert!(matches!(session.tick(16.0, &mut host, &mut backend), Err(FrameError::Draw(_))));
    assert!(host.outstanding.is_some());

    let outcomes = run(&mut session, &mut host, &mut backend, 32.0, 2);
    assert!(outcomes.iter().all(|o| matches!(o, TickOutcome::Drawn { .. })));
    assert_eq!(session.frame_index(), 3);
}

#[test]
fn wheel_never_collapses_the_radius() {
    let mut session = session(SortStrategy::Full, 1, 64);
    let mut host = Host::default();

    for _ in 0..200 {
        session.handle_input(
            &InputEvent::MouseWheel {
                delta: MouseWheelDelta::Pixel { x: 0.0, y: 500.0 },
            },
            &mut host,
        );
        assert!(session.params().radius > 0.0);
    }

    let near = session.params().radius;
    session.handle_input(
        &InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y: -3.0 },
        },
        &mut host,
    );
    assert!(session.params().radius > near, "scrolling toward the user dollies out");
}

#[test]
fn fps_tracks_the_mean_of_the_window() {
    let mut session = session(SortStrategy::Full, 1, 64);
    let (mut host, mut backend) = (Host::default(), Backend::default());
    session.start(&mut host);

    let outcomes = run(&mut session, &mut host, &mut backend, 16.0, 5);
    for outcome in &outcomes {
        let TickOutcome::Drawn { fps: Some(sample), .. } = outcome else {
            panic!("expected a drawn frame with a sample, got {outcome:?}");
        };
        assert!((sample.fps - 62.5).abs() < 1e-9);
        assert!((sample.average - 62.5).abs() < 1e-9);
    }

    // A repeated timestamp is absorbed.
    assert!(host.deliver());
    let outcome = session.tick(16.0 + 16.0 * 4.0, &mut host, &mut backend).unwrap();
    assert!(matches!(outcome, TickOutcome::Drawn { fps: None, .. }));
    assert_eq!(session.fps().num_frames(), 5);
}

#[test]
fn sort_failure_draws_stale_once_then_errors_and_stays_scheduled() {
    let config = SessionConfig {
        group_size: 32,
        sort_interval: 1,
        ..SessionConfig::default()
    };
    let failures = Rc::new(Cell::new(0));
    let engine = FlakyEngine {
        inner: CpuSortEngine::new(),
        failures: failures.clone(),
    };
    let mut session = RenderSession::new(&config, ring(64), engine).unwrap();
    let (mut host, mut backend) = (Host::default(), Backend::default());
    session.start(&mut host);

    assert!(host.deliver());
    let outcome = session.tick(16.0, &mut host, &mut backend).unwrap();
    assert!(matches!(outcome, TickOutcome::Drawn { resorted: true, stale: false, .. }));

    failures.set(2);

    // First failure: the previous order is drawn again.
    assert!(host.deliver());
    let outcome = session.tick(32.0, &mut host, &mut backend).unwrap();
    assert!(matches!(outcome, TickOutcome::Drawn { resorted: false, stale: true, .. }));
    assert_eq!(backend.generations, vec![1, 1]);

    // Second failure in a row is surfaced, and the loop keeps going.
    assert!(host.deliver());
    assert!(matches!(
        session.tick(48.0, &mut host, &mut backend),
        Err(FrameError::Sort(SortError::Engine(_)))
    ));
    assert!(host.outstanding.is_some());
    assert_eq!(session.state(), LoopState::Running);
    assert_eq!(backend.generations.len(), 2);

    assert!(host.deliver());
    let outcome = session.tick(64.0, &mut host, &mut backend).unwrap();
    assert!(matches!(outcome, TickOutcome::Drawn { resorted: true, stale: false, .. }));
    assert_eq!(backend.generations, vec![1, 1, 2]);
    assert_eq!(failures.get(), 0);
}
