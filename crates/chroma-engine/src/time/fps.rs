use std::time::{Duration, Instant};

/// Exponentially smoothed frames-per-second estimate.
///
/// `smoothing` in `(0, 1]`; values closer to 1 weight new samples more.
/// `report` rate-limits how often the estimate is surfaced (e.g. to a window
/// title, which is comparatively expensive to update).
#[derive(Debug, Clone)]
pub struct FpsCounter {
    fps: f32,
    smoothing: f32,
    report_interval: Duration,
    last_report: Option<Instant>,
}

impl FpsCounter {
    pub const DEFAULT_SMOOTHING: f32 = 0.2;
    pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self::with_params(Self::DEFAULT_SMOOTHING, Self::DEFAULT_REPORT_INTERVAL)
    }

    pub fn with_params(smoothing: f32, report_interval: Duration) -> Self {
        Self {
            fps: 0.0,
            smoothing: smoothing.clamp(f32::EPSILON, 1.0),
            report_interval,
            last_report: None,
        }
    }

    /// Feeds one frame's delta time in seconds.
    pub fn record(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let sample = 1.0 / dt;
        self.fps = self.fps * (1.0 - self.smoothing) + sample * self.smoothing;
    }

    /// Current smoothed estimate.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Returns the estimate if at least `report_interval` has passed since the
    /// last report (the first call always reports).
    pub fn report(&mut self, now: Instant) -> Option<f32> {
        let due = match self.last_report {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.report_interval,
        };
        if !due {
            return None;
        }
        self.last_report = Some(now);
        Some(self.fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
