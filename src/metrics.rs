//! Request metrics and statistics tracking for the fraud detection API.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Process-wide metrics collector, shared by reference across request
/// handlers. Counters are atomic so concurrent requests never lose updates.
pub struct ServiceMetrics {
    /// Total scoring requests received (single and batch)
    pub total_requests: AtomicU64,
    /// Total transactions scored
    pub predictions: AtomicU64,
    /// Batch requests processed
    pub batch_predictions: AtomicU64,
    /// Transactions classified as fraud
    pub fraud_detected: AtomicU64,
    /// Transactions classified as legitimate
    pub non_fraud_detected: AtomicU64,
    /// Requests that ended in an error
    pub errors: AtomicU64,
    /// Response time samples (in microseconds)
    response_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            predictions: AtomicU64::new(0),
            batch_predictions: AtomicU64::new(0),
            fraud_detected: AtomicU64::new(0),
            non_fraud_detected: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            response_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record one successfully scored transaction.
    pub fn record_prediction(&self, response_time: Duration, is_fraud: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if is_fraud {
            self.fraud_detected.fetch_add(1, Ordering::Relaxed);
        } else {
            self.non_fraud_detected.fetch_add(1, Ordering::Relaxed);
        }
        self.record_response_time(response_time);
    }

    /// Record one successfully scored batch.
    pub fn record_batch(&self, response_time: Duration, total: u64, fraud: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.batch_predictions.fetch_add(1, Ordering::Relaxed);
        self.predictions.fetch_add(total, Ordering::Relaxed);
        self.fraud_detected.fetch_add(fraud, Ordering::Relaxed);
        self.non_fraud_detected
            .fetch_add(total - fraud, Ordering::Relaxed);
        self.record_response_time(response_time);
    }

    /// Record a failed request.
    pub fn record_error(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_response_time(&self, response_time: Duration) {
        if let Ok(mut times) = self.response_times.write() {
            times.push(response_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Get response time statistics over the retained window.
    pub fn get_latency_stats(&self) -> LatencyStats {
        let times = self.response_times.read().unwrap();
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second since startup).
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_requests.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Snapshot the counters for the `/metrics` endpoint.
    pub fn snapshot(&self, model_loaded: bool) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let error_rate = if total_requests > 0 {
            errors as f64 / total_requests as f64
        } else {
            0.0
        };

        let latency = self.get_latency_stats();

        MetricsSnapshot {
            total_requests,
            predictions: self.predictions.load(Ordering::Relaxed),
            batch_predictions: self.batch_predictions.load(Ordering::Relaxed),
            fraud_detected: self.fraud_detected.load(Ordering::Relaxed),
            non_fraud_detected: self.non_fraud_detected.load(Ordering::Relaxed),
            errors,
            error_rate,
            avg_response_time_ms: latency.mean_us as f64 / 1000.0,
            p95_response_time_ms: latency.p95_us as f64 / 1000.0,
            max_response_time_ms: latency.max_us as f64 / 1000.0,
            requests_per_second: self.get_throughput(),
            model_loaded,
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Response time statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Point-in-time view of the counters, served from `/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub predictions: u64,
    pub batch_predictions: u64,
    pub fraud_detected: u64,
    pub non_fraud_detected: u64,
    pub errors: u64,
    pub error_rate: f64,
    pub avg_response_time_ms: f64,
    pub p95_response_time_ms: f64,
    pub max_response_time_ms: f64,
    pub requests_per_second: f64,
    pub model_loaded: bool,
}
