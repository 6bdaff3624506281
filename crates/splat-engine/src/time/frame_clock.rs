use std::time::Instant;

/// Timing snapshot for one host tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the clock was created, the host animation timestamp
    /// handed to telemetry.
    pub timestamp_ms: f64,
}

/// Monotonic clock stamping delivered ticks.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn tick(&self) -> FrameTime {
        FrameTime {
            timestamp_ms: self.origin.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
