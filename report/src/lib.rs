use serde::Serialize;

use bridge::PageEvent;
use memory::{LeakReport, TrendDetector};
use timing::{FrameSampler, InteractionLog, RenderTimer};
use vitals::{VitalsCollector, VitalsGrades, VitalsMetrics};

/// Mean render time above this costs 20 points.
pub const RENDER_BUDGET_MS: f64 = 16.0;

/// Frame rate below this costs 20 points.
pub const FPS_FLOOR: f64 = 55.0;

/// Memory usage above this costs 15 points.
pub const MEMORY_CEILING_MB: f64 = 100.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One snapshot of everything the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub average_render_ms: f64,
    pub current_fps: f64,
    pub memory_used_mb: f64,
    pub interaction_count: u64,
    pub score: u8,
}

/// Owns every tracker and exposes the read-only poll surface.
///
/// Page events decoded by the engine are routed here; the dashboard polls
/// [`summary`], [`vitals_metrics`] / [`vitals_grades`], and [`detect_leaks`]
/// on a fixed interval and never mutates tracker state.
///
/// [`summary`]: Monitor::summary
/// [`vitals_metrics`]: Monitor::vitals_metrics
/// [`vitals_grades`]: Monitor::vitals_grades
/// [`detect_leaks`]: Monitor::detect_leaks
#[derive(Debug, Default)]
pub struct Monitor {
    render: RenderTimer,
    frames: FrameSampler,
    interactions: InteractionLog,
    vitals: VitalsCollector,
    trend: TrendDetector,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes one decoded page event to the tracker that owns its metric.
    pub fn apply_page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Paint { name, start_time } => {
                self.vitals.record_paint(&name, start_time);
            }
            PageEvent::LargestContentfulPaint { start_time } => {
                self.vitals.record_largest_contentful_paint(start_time);
            }
            PageEvent::LayoutShift {
                value,
                had_recent_input,
            } => {
                self.vitals.record_layout_shift(value, had_recent_input);
            }
            PageEvent::FirstInput { delay } => {
                self.vitals.record_first_input(delay);
            }
            PageEvent::Event {
                name,
                target,
                duration,
            } => {
                self.interactions.record(&name, &target, duration);
            }
            PageEvent::Measure { name, duration } => {
                self.render.record(&name, duration);
            }
        }
    }

    /// Records one frame-clock callback.
    pub fn record_frame(&mut self, timestamp_ms: f64) {
        self.frames.record_frame(timestamp_ms);
    }

    /// Freezes the frame-rate estimate until sampling resumes.
    pub fn pause_frames(&mut self) {
        self.frames.pause();
    }

    /// Times host-side work under the given component name.
    pub fn track_render<T>(&mut self, component: &str, work: impl FnOnce() -> T) -> T {
        self.render.track_render(component, work)
    }

    /// Mutable access for draining the heap-sample channel.
    pub fn trend_mut(&mut self) -> &mut TrendDetector {
        &mut self.trend
    }

    pub fn vitals_metrics(&self) -> VitalsMetrics {
        self.vitals.metrics()
    }

    pub fn vitals_grades(&self) -> VitalsGrades {
        self.vitals.grades()
    }

    pub fn detect_leaks(&self) -> LeakReport {
        self.trend.detect()
    }

    pub fn summary(&self) -> Summary {
        let average_render_ms = self.render.average_duration_ms();
        let current_fps = self.frames.fps();
        let memory_used_mb = self
            .trend
            .latest_used_bytes()
            .map(|bytes| bytes as f64 / BYTES_PER_MB)
            .unwrap_or(0.0);

        Summary {
            average_render_ms,
            current_fps,
            memory_used_mb,
            interaction_count: self.interactions.total_recorded(),
            score: score(average_render_ms, current_fps, memory_used_mb),
        }
    }
}

/// Deterministic rule table; the exact thresholds and deductions are part
/// of the monitor's observable behavior.
pub fn score(average_render_ms: f64, current_fps: f64, memory_used_mb: f64) -> u8 {
    let mut score: i32 = 100;
    if average_render_ms > RENDER_BUDGET_MS {
        score -= 20;
    }
    if current_fps < FPS_FLOOR {
        score -= 20;
    }
    if memory_used_mb > MEMORY_CEILING_MB {
        score -= 15;
    }
    score.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_renders_and_low_fps_cost_forty_points() {
        assert_eq!(score(20.0, 50.0, 50.0), 60);
    }

    #[test]
    fn high_memory_alone_costs_fifteen_points() {
        assert_eq!(score(10.0, 60.0, 150.0), 85);
    }

    #[test]
    fn every_deduction_together_stays_in_range() {
        assert_eq!(score(20.0, 50.0, 150.0), 45);
        assert_eq!(score(0.0, 60.0, 0.0), 80);
        assert_eq!(score(10.0, 60.0, 50.0), 100);
    }

    #[test]
    fn empty_monitor_summarizes_to_zeroes() {
        let monitor = Monitor::new();
        let summary = monitor.summary();

        assert_eq!(summary.average_render_ms, 0.0);
        assert_eq!(summary.current_fps, 0.0);
        assert_eq!(summary.memory_used_mb, 0.0);
        assert_eq!(summary.interaction_count, 0);
        // No frames sampled reads as zero FPS, which is below the floor.
        assert_eq!(summary.score, 80);
    }

    #[test]
    fn page_events_reach_their_trackers() {
        let mut monitor = Monitor::new();
        monitor.apply_page_event(PageEvent::Paint {
            name: "first-contentful-paint".to_string(),
            start_time: 900.0,
        });
        monitor.apply_page_event(PageEvent::LargestContentfulPaint { start_time: 2300.0 });
        monitor.apply_page_event(PageEvent::LayoutShift {
            value: 0.05,
            had_recent_input: false,
        });
        monitor.apply_page_event(PageEvent::FirstInput { delay: 40.0 });
        monitor.apply_page_event(PageEvent::Event {
            name: "click".to_string(),
            target: "BUTTON".to_string(),
            duration: 32.0,
        });
        monitor.apply_page_event(PageEvent::Measure {
            name: "hero-render".to_string(),
            duration: 12.0,
        });

        let metrics = monitor.vitals_metrics();
        assert_eq!(metrics.fcp_ms, Some(900.0));
        assert_eq!(metrics.lcp_ms, Some(2300.0));
        assert_eq!(metrics.fid_ms, Some(40.0));

        let summary = monitor.summary();
        assert_eq!(summary.interaction_count, 1);
        assert!((summary.average_render_ms - 12.0).abs() < 1e-9);
    }

    #[test]
    fn healthy_page_scores_full_marks() {
        let mut monitor = Monitor::new();
        for frame in 0..30 {
            monitor.record_frame(frame as f64 * 16.0);
        }
        monitor.apply_page_event(PageEvent::Measure {
            name: "hero-render".to_string(),
            duration: 8.0,
        });
        monitor.trend_mut().record(50 * 1024 * 1024);

        let summary = monitor.summary();
        assert!((summary.current_fps - 62.5).abs() < 1e-9);
        assert_eq!(summary.memory_used_mb, 50.0);
        assert_eq!(summary.score, 100);
    }
}
