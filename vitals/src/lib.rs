use std::fmt;

use serde::Serialize;

/// Published grading thresholds, lower band inclusive: a metric at or below
/// the first value is good, at or below the second needs improvement, and
/// anything past that is poor.
pub const FCP_THRESHOLDS_MS: (f64, f64) = (1800.0, 3000.0);
pub const LCP_THRESHOLDS_MS: (f64, f64) = (2500.0, 4000.0);
pub const CLS_THRESHOLDS: (f64, f64) = (0.1, 0.25);
pub const FID_THRESHOLDS_MS: (f64, f64) = (100.0, 300.0);

/// Paint entry name that carries First Contentful Paint.
pub const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

/// Grading band for a single vital.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Grade {
    Good,
    NeedsImprovement,
    Poor,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grade::Good => "good",
            Grade::NeedsImprovement => "needs-improvement",
            Grade::Poor => "poor",
        };
        write!(f, "{label}")
    }
}

/// Latest observed value per vital. An unobserved metric is `None` and is
/// rendered as "measuring" by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VitalsMetrics {
    pub fcp_ms: Option<f64>,
    pub lcp_ms: Option<f64>,
    pub cls: Option<f64>,
    pub fid_ms: Option<f64>,
}

/// Grades for whichever metrics have been observed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VitalsGrades {
    pub fcp: Option<Grade>,
    pub lcp: Option<Grade>,
    pub cls: Option<Grade>,
    pub fid: Option<Grade>,
}

/// Accumulates Core Web Vitals from the page's performance-entry streams.
///
/// Update rules differ per metric: FCP and FID keep their first value, LCP
/// keeps the latest candidate, and CLS sums unflagged layout shifts.
#[derive(Debug, Default)]
pub struct VitalsCollector {
    metrics: VitalsMetrics,
}

impl VitalsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a paint-timing entry. Only the first-contentful-paint entry
    /// is relevant, and the browser reports it exactly once.
    pub fn record_paint(&mut self, name: &str, start_time_ms: f64) {
        if name == FIRST_CONTENTFUL_PAINT && self.metrics.fcp_ms.is_none() {
            self.metrics.fcp_ms = Some(start_time_ms);
        }
    }

    /// Records an LCP candidate. Candidates keep arriving as the page loads,
    /// so the latest one always wins.
    pub fn record_largest_contentful_paint(&mut self, start_time_ms: f64) {
        self.metrics.lcp_ms = Some(start_time_ms);
    }

    /// Accumulates a layout shift. Shifts caused by recent user input are
    /// excluded from the cumulative score.
    pub fn record_layout_shift(&mut self, value: f64, had_recent_input: bool) {
        if had_recent_input {
            return;
        }
        let current = self.metrics.cls.unwrap_or(0.0);
        self.metrics.cls = Some(current + value);
    }

    /// Records the first-input delay. The first qualifying input wins.
    pub fn record_first_input(&mut self, delay_ms: f64) {
        if self.metrics.fid_ms.is_none() {
            self.metrics.fid_ms = Some(delay_ms);
        }
    }

    pub fn metrics(&self) -> VitalsMetrics {
        self.metrics
    }

    pub fn grades(&self) -> VitalsGrades {
        VitalsGrades {
            fcp: self.metrics.fcp_ms.map(|v| grade(v, FCP_THRESHOLDS_MS)),
            lcp: self.metrics.lcp_ms.map(|v| grade(v, LCP_THRESHOLDS_MS)),
            cls: self.metrics.cls.map(|v| grade(v, CLS_THRESHOLDS)),
            fid: self.metrics.fid_ms.map(|v| grade(v, FID_THRESHOLDS_MS)),
        }
    }
}

fn grade(value: f64, (good, acceptable): (f64, f64)) -> Grade {
    if value <= good {
        Grade::Good
    } else if value <= acceptable {
        Grade::NeedsImprovement
    } else {
        Grade::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcp_grade_bands_are_lower_inclusive() {
        assert_eq!(grade(2500.0, LCP_THRESHOLDS_MS), Grade::Good);
        assert_eq!(grade(2600.0, LCP_THRESHOLDS_MS), Grade::NeedsImprovement);
        assert_eq!(grade(4000.0, LCP_THRESHOLDS_MS), Grade::NeedsImprovement);
        assert_eq!(grade(4001.0, LCP_THRESHOLDS_MS), Grade::Poor);
    }

    #[test]
    fn remaining_thresholds_match_published_bands() {
        assert_eq!(grade(1800.0, FCP_THRESHOLDS_MS), Grade::Good);
        assert_eq!(grade(3000.1, FCP_THRESHOLDS_MS), Grade::Poor);
        assert_eq!(grade(0.1, CLS_THRESHOLDS), Grade::Good);
        assert_eq!(grade(0.2, CLS_THRESHOLDS), Grade::NeedsImprovement);
        assert_eq!(grade(100.0, FID_THRESHOLDS_MS), Grade::Good);
        assert_eq!(grade(301.0, FID_THRESHOLDS_MS), Grade::Poor);
    }

    #[test]
    fn cls_accumulates_and_ignores_flagged_shifts() {
        let mut collector = VitalsCollector::new();
        collector.record_layout_shift(0.05, false);
        collector.record_layout_shift(0.04, false);
        assert!((collector.metrics().cls.unwrap() - 0.09).abs() < 1e-9);
        assert_eq!(collector.grades().cls, Some(Grade::Good));

        // A shift driven by user input must not move the score.
        collector.record_layout_shift(0.5, true);
        assert!((collector.metrics().cls.unwrap() - 0.09).abs() < 1e-9);
    }

    #[test]
    fn fcp_keeps_its_first_value() {
        let mut collector = VitalsCollector::new();
        collector.record_paint("first-paint", 400.0);
        assert_eq!(collector.metrics().fcp_ms, None);

        collector.record_paint(FIRST_CONTENTFUL_PAINT, 900.0);
        collector.record_paint(FIRST_CONTENTFUL_PAINT, 1500.0);
        assert_eq!(collector.metrics().fcp_ms, Some(900.0));
    }

    #[test]
    fn lcp_keeps_the_latest_candidate() {
        let mut collector = VitalsCollector::new();
        collector.record_largest_contentful_paint(1200.0);
        collector.record_largest_contentful_paint(2300.0);
        assert_eq!(collector.metrics().lcp_ms, Some(2300.0));
    }

    #[test]
    fn fid_keeps_the_first_qualifying_input() {
        let mut collector = VitalsCollector::new();
        collector.record_first_input(80.0);
        collector.record_first_input(250.0);
        assert_eq!(collector.metrics().fid_ms, Some(80.0));
        assert_eq!(collector.grades().fid, Some(Grade::Good));
    }

    #[test]
    fn unobserved_metrics_are_ungraded() {
        let collector = VitalsCollector::new();
        let grades = collector.grades();
        assert_eq!(grades.fcp, None);
        assert_eq!(grades.lcp, None);
        assert_eq!(grades.cls, None);
        assert_eq!(grades.fid, None);
    }
}
