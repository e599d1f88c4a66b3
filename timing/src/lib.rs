use std::time::Instant;

use util::RingBuffer;

/// Retained frame-interval samples.
pub const FRAME_WINDOW: usize = 60;

/// Retained render samples.
pub const RENDER_WINDOW: usize = 120;

/// Retained interaction samples.
pub const INTERACTION_WINDOW: usize = 120;

/// One timed render of a named component.
#[derive(Debug, Clone)]
pub struct RenderSample {
    pub component: String,
    pub duration_ms: f64,
    pub recorded_at: Instant,
}

/// Wall-clock render timing per named component.
///
/// Samples come from two paths: host-side work wrapped in [`track_render`],
/// and page-side `performance.measure` entries delivered by the bridge via
/// [`record`].
///
/// [`track_render`]: RenderTimer::track_render
/// [`record`]: RenderTimer::record
#[derive(Debug)]
pub struct RenderTimer {
    samples: RingBuffer<RenderSample>,
}

impl RenderTimer {
    pub fn new() -> Self {
        Self {
            samples: RingBuffer::new(RENDER_WINDOW),
        }
    }

    /// Runs `work`, records its duration under `component`, and returns its
    /// value unchanged.
    ///
    /// If `work` panics the unwind propagates unmodified and no sample is
    /// recorded; the timer itself stays usable.
    pub fn track_render<T>(&mut self, component: &str, work: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let value = work();
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.record(component, duration_ms);
        value
    }

    /// Records an externally measured render duration.
    pub fn record(&mut self, component: &str, duration_ms: f64) {
        self.samples.push(RenderSample {
            component: component.to_string(),
            duration_ms,
            recorded_at: Instant::now(),
        });
    }

    /// Arithmetic mean over the retained window, 0.0 when empty.
    pub fn average_duration_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: f64 = self.samples.iter().map(|sample| sample.duration_ms).sum();
        total / self.samples.len() as f64
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> impl Iterator<Item = &RenderSample> {
        self.samples.iter()
    }
}

impl Default for RenderTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling frame-rate estimate from frame-clock timestamps.
///
/// Fed monotonic timestamps in milliseconds, one per frame callback. Each
/// call records the delta from the previous callback into a fixed window;
/// the estimate is frozen while paused.
#[derive(Debug)]
pub struct FrameSampler {
    last_frame_ms: Option<f64>,
    deltas: RingBuffer<f64>,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self {
            last_frame_ms: None,
            deltas: RingBuffer::new(FRAME_WINDOW),
        }
    }

    /// Records one frame-clock callback at `timestamp_ms`.
    pub fn record_frame(&mut self, timestamp_ms: f64) {
        if let Some(previous) = self.last_frame_ms {
            self.deltas.push(timestamp_ms - previous);
        }
        self.last_frame_ms = Some(timestamp_ms);
    }

    /// Drops the previous-timestamp anchor so the gap across a pause is
    /// never recorded as a frame interval.
    pub fn pause(&mut self) {
        self.last_frame_ms = None;
    }

    /// Mean frame interval over the retained window.
    pub fn average_delta_ms(&self) -> Option<f64> {
        if self.deltas.is_empty() {
            return None;
        }
        let total: f64 = self.deltas.iter().sum();
        Some(total / self.deltas.len() as f64)
    }

    /// Current frames per second, 0.0 when no frames have been sampled.
    pub fn fps(&self) -> f64 {
        match self.average_delta_ms() {
            Some(delta) if delta > 0.0 => 1000.0 / delta,
            _ => 0.0,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.deltas.len()
    }

    pub fn deltas(&self) -> impl Iterator<Item = &f64> {
        self.deltas.iter()
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// One user interaction observed on the page.
#[derive(Debug, Clone)]
pub struct InteractionSample {
    pub kind: String,
    pub target: String,
    pub duration_ms: f64,
    pub recorded_at: Instant,
}

/// Bounded log of page interactions with a total that survives eviction.
#[derive(Debug)]
pub struct InteractionLog {
    samples: RingBuffer<InteractionSample>,
    total_recorded: u64,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self {
            samples: RingBuffer::new(INTERACTION_WINDOW),
            total_recorded: 0,
        }
    }

    pub fn record(&mut self, kind: &str, target: &str, duration_ms: f64) {
        self.samples.push(InteractionSample {
            kind: kind.to_string(),
            target: target.to_string(),
            duration_ms,
            recorded_at: Instant::now(),
        });
        self.total_recorded += 1;
    }

    /// Total interactions ever recorded, independent of the retained window.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    pub fn samples(&self) -> impl Iterator<Item = &InteractionSample> {
        self.samples.iter()
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new()
    }
}
