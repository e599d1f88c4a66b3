use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;
use util::RingBuffer;

use crate::{HeapReading, HeapSource};

/// Retained memory samples.
pub const MEMORY_WINDOW: usize = 100;

/// Samples per comparison window for leak detection.
const LEAK_WINDOW: usize = 10;

/// Growth ratio at or above which a leak is flagged.
const GROWTH_THRESHOLD: f64 = 0.10;

/// One retained heap-usage sample.
#[derive(Debug, Clone, Copy)]
pub struct MemorySample {
    pub used_bytes: u64,
    pub recorded_at: Instant,
}

/// Leak verdict from comparing adjacent sampling windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakReport {
    pub has_leak: bool,
    pub confidence: f64,
    pub growth_ratio: f64,
}

impl LeakReport {
    fn none() -> Self {
        Self {
            has_leak: false,
            confidence: 0.0,
            growth_ratio: 0.0,
        }
    }
}

/// Growth-ratio heuristic over a bounded heap-sample window.
///
/// Compares the mean of the most recent samples against the mean of the
/// window immediately before it. Steady growth across adjacent windows is
/// the leak signal; a single allocation spike decays out of the window.
#[derive(Debug)]
pub struct TrendDetector {
    samples: RingBuffer<MemorySample>,
}

impl TrendDetector {
    pub fn new() -> Self {
        Self {
            samples: RingBuffer::new(MEMORY_WINDOW),
        }
    }

    pub fn record(&mut self, used_bytes: u64) {
        self.samples.push(MemorySample {
            used_bytes,
            recorded_at: Instant::now(),
        });
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Most recent heap usage, if any has been sampled.
    pub fn latest_used_bytes(&self) -> Option<u64> {
        self.samples.latest().map(|sample| sample.used_bytes)
    }

    /// Compares the last [`LEAK_WINDOW`] samples against the up-to-ten
    /// samples before them. Too little history, an empty older window, or a
    /// zero-valued older mean all report no leak with zero confidence.
    pub fn detect(&self) -> LeakReport {
        let count = self.samples.len();
        if count < LEAK_WINDOW {
            return LeakReport::none();
        }

        let values: Vec<f64> = self
            .samples
            .iter()
            .map(|sample| sample.used_bytes as f64)
            .collect();
        let recent = &values[count - LEAK_WINDOW..];
        let older_start = count.saturating_sub(2 * LEAK_WINDOW);
        let older = &values[older_start..count - LEAK_WINDOW];
        if older.is_empty() {
            return LeakReport::none();
        }

        let older_mean = mean(older);
        if older_mean <= 0.0 {
            return LeakReport::none();
        }
        let recent_mean = mean(recent);

        let growth_ratio = (recent_mean - older_mean) / older_mean;
        LeakReport {
            has_leak: growth_ratio >= GROWTH_THRESHOLD,
            confidence: (growth_ratio * 10.0).clamp(0.0, 1.0),
            growth_ratio,
        }
    }
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Background sampler that emits heap readings over a channel.
///
/// The worker performs blocking I/O off the UI thread. The receiver is
/// drained non-blockingly from the main loop, so the detector's buffer
/// keeps a single producer and samples stay chronological.
pub struct HeapSampleReceiver {
    receiver: Receiver<HeapReading>,
}

impl HeapSampleReceiver {
    /// Spawns the sampling worker. The worker exits when this receiver is
    /// dropped and its next send fails.
    pub fn start<S: HeapSource + Send + 'static>(mut source: S, interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut warned = false;
            loop {
                match source.sample() {
                    Some(reading) => {
                        if sender.send(reading).is_err() {
                            break;
                        }
                    }
                    None => {
                        if !warned {
                            warn!("heap usage counter unavailable; memory metrics degrade to zero");
                            warned = true;
                        }
                    }
                }
                thread::sleep(interval);
            }
        });

        Self { receiver }
    }

    /// Moves every pending reading into the detector. Returns how many were
    /// transferred.
    pub fn drain_into(&self, detector: &mut TrendDetector) -> usize {
        let mut drained = 0;
        while let Ok(reading) = self.receiver.try_recv() {
            detector.record(reading.used_bytes);
            drained += 1;
        }
        drained
    }
}
