use super::host::{FrameHost, TickHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Suspended,
    Terminated,
}

/// Whether a delivered tick should do any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickGate {
    /// Not running; ignore the tick.
    Idle,
    /// The surface is gone; the loop just terminated.
    Terminated,
    /// Run frame number `frame_index`.
    Run { frame_index: u64 },
}

/// Lifecycle of the host-driven frame loop.
///
/// At most one tick is pending at any time, and none is pending outside
/// `Running`. `Terminated` is final.
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    frame_index: u64,
    pending: Option<TickHandle>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Uninitialized,
            frame_index: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// `Uninitialized → Running`; requests the first tick.
    pub fn start(&mut self, host: &mut dyn FrameHost) -> bool {
        if self.state != LoopState::Uninitialized {
            return false;
        }
        self.transition(LoopState::Running);
        self.schedule(host);
        true
    }

    /// `Running ⇄ Suspended`. Returns `false` when the call changed nothing.
    pub fn set_visible(&mut self, visible: bool, host: &mut dyn FrameHost) -> bool {
        match (self.state, visible) {
            (LoopState::Running, false) => {
                self.cancel(host);
                self.transition(LoopState::Suspended);
                true
            }
            (LoopState::Suspended, true) => {
                self.transition(LoopState::Running);
                self.schedule(host);
                true
            }
            _ => false,
        }
    }

    /// Any state `→ Terminated`, cancelling the pending tick.
    pub fn terminate(&mut self, host: &mut dyn FrameHost) {
        if self.state == LoopState::Terminated {
            return;
        }
        self.cancel(host);
        self.transition(LoopState::Terminated);
    }

    /// Consumes the pending request for a delivered tick and decides whether
    /// to run it.
    pub fn begin_tick(&mut self, host: &mut dyn FrameHost) -> TickGate {
        if self.state != LoopState::Running {
            return TickGate::Idle;
        }
        self.pending = None;

        if !host.surface_attached() {
            self.terminate(host);
            return TickGate::Terminated;
        }

        TickGate::Run {
            frame_index: self.frame_index,
        }
    }

    /// Counts the frame and requests the next tick. Called once per
    /// [`TickGate::Run`], whether the frame drew or failed.
    pub fn end_tick(&mut self, host: &mut dyn FrameHost) {
        self.frame_index += 1;
        if self.state == LoopState::Running {
            self.schedule(host);
        }
    }

    fn schedule(&mut self, host: &mut dyn FrameHost) {
        if self.pending.is_none() {
            self.pending = Some(host.request_tick());
        }
    }

    fn cancel(&mut self, host: &mut dyn FrameHost) {
        if let Some(handle) = self.pending.take() {
            host.cancel_tick(handle);
        }
    }

    fn transition(&mut self, to: LoopState) {
        log::info!("frame loop: {:?} -> {:?}", self.state, to);
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHost {
        next: u64,
        requested: Vec<TickHandle>,
        cancelled: Vec<TickHandle>,
        detached: bool,
    }

    impl FrameHost for CountingHost {
        fn request_tick(&mut self) -> TickHandle {
            self.next += 1;
            let h = TickHandle::new(self.next);
            self.requested.push(h);
            h
        }

        fn cancel_tick(&mut self, handle: TickHandle) {
            self.cancelled.push(handle);
        }

        fn surface_attached(&self) -> bool {
            !self.detached
        }
    }

    #[test]
    fn start_only_from_uninitialized() {
        let mut host = CountingHost::default();
        let mut lp = FrameLoop::new();
        assert!(lp.start(&mut host));
        assert!(!lp.start(&mut host));
        assert_eq!(host.requested.len(), 1);
        assert_eq!(lp.state(), LoopState::Running);
    }

    #[test]
    fn hiding_cancels_and_showing_requests() {
        let mut host = CountingHost::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut host);
        let first = lp.pending().unwrap();

        assert!(lp.set_visible(false, &mut host));
        assert_eq!(lp.state(), LoopState::Suspended);
        assert_eq!(host.cancelled, vec![first]);
        assert!(lp.pending().is_none());
        assert_eq!(lp.begin_tick(&mut host), TickGate::Idle);

        assert!(!lp.set_visible(false, &mut host));
        assert!(lp.set_visible(true, &mut host));
        assert_eq!(host.requested.len(), 2);
    }

    #[test]
    fn detached_surface_terminates_without_rescheduling() {
        let mut host = CountingHost::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut host);
        host.detached = true;

        assert_eq!(lp.begin_tick(&mut host), TickGate::Terminated);
        assert_eq!(lp.state(), LoopState::Terminated);
        assert!(lp.pending().is_none());
        assert_eq!(host.requested.len(), 1);
        assert!(!lp.set_visible(true, &mut host));
    }

    #[test]
    fn frame_index_counts_run_ticks() {
        let mut host = CountingHost::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut host);
        for expected in 0..3 {
            assert_eq!(lp.begin_tick(&mut host), TickGate::Run { frame_index: expected });
            lp.end_tick(&mut host);
        }
        assert_eq!(lp.frame_index(), 3);
        assert_eq!(host.requested.len(), 4);
    }
}
