//! Performance metrics and statistics tracking for the classifier.
//!
//! Diagnostic only: nothing here carries contractual meaning to callers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the inference pipeline
pub struct ClassifierMetrics {
    /// Total images classified
    pub predictions: AtomicU64,
    /// Images classified as infected
    pub infected: AtomicU64,
    /// Inputs rejected as undecodable
    pub decode_failures: AtomicU64,
    /// Model-side failures degraded to a negative verdict
    pub inference_failures: AtomicU64,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Score distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ClassifierMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            infected: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a completed classification
    pub fn record_prediction(&self, processing_time: Duration, score: f32, infected: bool) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if infected {
            self.infected.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = ((score as f64) * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record an input that could not be decoded
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a model-side failure that degraded to a negative verdict
    pub fn record_inference_failure(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = match self.processing_times.read() {
            Ok(times) => times,
            Err(_) => return ProcessingStats::default(),
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (classifications per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get score distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let total = self.predictions.load(Ordering::Relaxed);
        let infected = self.infected.load(Ordering::Relaxed);
        let decode_failures = self.decode_failures.load(Ordering::Relaxed);
        let inference_failures = self.inference_failures.load(Ordering::Relaxed);
        let infected_rate = if total > 0 {
            (infected as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let score_dist = self.get_score_distribution();

        info!(
            classified = total,
            infected = infected,
            infected_rate = format!("{infected_rate:.1}%"),
            decode_failures = decode_failures,
            inference_failures = inference_failures,
            throughput = format!("{:.1}/s", self.get_throughput()),
            "Classifier metrics summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            max_us = processing.max_us,
            "Processing time (per image)"
        );

        let bucketed: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pct = (count as f64 / bucketed as f64) * 100.0;
            info!(
                "Score {:.1}-{:.1}: {:>6} ({:>5.1}%)",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct
            );
        }
    }
}

impl Default for ClassifierMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ClassifierMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ClassifierMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ClassifierMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.8, true);
        metrics.record_prediction(Duration::from_micros(200), 0.2, false);
        metrics.record_decode_failure();
        metrics.record_inference_failure();

        assert_eq!(metrics.predictions.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.infected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.decode_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.inference_failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ClassifierMetrics::new();
        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us), 0.5, false);
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
    }

    #[test]
    fn test_score_distribution_buckets() {
        let metrics = ClassifierMetrics::new();
        metrics.record_prediction(Duration::from_micros(10), 0.05, false);
        metrics.record_prediction(Duration::from_micros(10), 0.95, true);
        metrics.record_prediction(Duration::from_micros(10), 1.0, true);

        let dist = metrics.get_score_distribution();
        assert_eq!(dist[0], 1);
        assert_eq!(dist[9], 2);
    }
}
