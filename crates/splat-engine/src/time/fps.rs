/// Window size used when no configuration overrides it.
pub const DEFAULT_MAX_FRAMES: usize = 20;

/// One telemetry reading.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FpsSample {
    /// FPS derived from the interval since the previous call.
    pub fps: f64,
    /// Mean of the samples currently held in the window.
    pub average: f64,
}

/// Fixed-window FPS statistics.
///
/// Samples live in a ring buffer of `max_frames` entries. The running total is
/// maintained incrementally (subtract the overwritten sample, add the new one),
/// so recording is O(1) regardless of the window size.
#[derive(Debug, Clone)]
pub struct FpsStats {
    then: f64,
    frame_times: Vec<f64>,
    frame_cursor: usize,
    num_frames: usize,
    max_frames: usize,
    total_fps: f64,
}

impl FpsStats {
    /// Creates an empty window. `max_frames` is raised to at least 1.
    pub fn new(max_frames: usize) -> Self {
        let max_frames = max_frames.max(1);
        Self {
            then: 0.0,
            frame_times: vec![0.0; max_frames],
            frame_cursor: 0,
            num_frames: 0,
            max_frames,
            total_fps: 0.0,
        }
    }

    /// Records a frame timestamp in milliseconds.
    ///
    /// Returns `None` without touching the window when no time elapsed since the
    /// previous call (or the clock went backwards).
    pub fn record_frame(&mut self, now_ms: f64) -> Option<FpsSample> {
        let delta = now_ms - self.then;
        self.then = now_ms;
        if !(delta > 0.0) {
            return None;
        }

        let fps = 1000.0 / delta;

        self.total_fps += fps - self.frame_times[self.frame_cursor];
        self.frame_times[self.frame_cursor] = fps;
        self.frame_cursor += 1;

        // Before the window fills up, the cursor is the count of valid entries.
        self.num_frames = self.num_frames.max(self.frame_cursor);
        self.frame_cursor %= self.max_frames;

        Some(FpsSample {
            fps,
            average: self.average(),
        })
    }

    /// Moves the baseline to `now_ms` without recording a sample, so the next
    /// interval is measured from here.
    pub fn rebase(&mut self, now_ms: f64) {
        self.then = now_ms;
    }

    /// Mean of the valid window, or 0 before the first sample.
    pub fn average(&self) -> f64 {
        if self.num_frames == 0 {
            0.0
        } else {
            self.total_fps / self.num_frames as f64
        }
    }

    /// Number of valid samples (saturates at `max_frames`).
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Running total of the valid samples.
    pub fn total_fps(&self) -> f64 {
        self.total_fps
    }

    /// The valid samples in storage order (not chronological once wrapped).
    pub fn samples(&self) -> &[f64] {
        &self.frame_times[..self.num_frames]
    }
}

impl Default for FpsStats {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAMES)
    }
}
