use crate::error::UrlError;
use crate::metrics::snapshot::MetricsSnapshot;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct MetricsCollector {
    urls_queued: Arc<AtomicU64>,
    urls_processed: Arc<AtomicU64>,
    files_written: Arc<AtomicU64>,
    bytes_written: Arc<AtomicU64>,
    network_errors: Arc<AtomicU64>,
    status_errors: Arc<AtomicU64>,
    read_errors: Arc<AtomicU64>,
    write_errors: Arc<AtomicU64>,
    active_tasks: Arc<AtomicU64>,
    total_fetch_time_ms: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            urls_queued: Arc::new(AtomicU64::new(0)),
            urls_processed: Arc::new(AtomicU64::new(0)),
            files_written: Arc::new(AtomicU64::new(0)),
            bytes_written: Arc::new(AtomicU64::new(0)),
            network_errors: Arc::new(AtomicU64::new(0)),
            status_errors: Arc::new(AtomicU64::new(0)),
            read_errors: Arc::new(AtomicU64::new(0)),
            write_errors: Arc::new(AtomicU64::new(0)),
            active_tasks: Arc::new(AtomicU64::new(0)),
            total_fetch_time_ms: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_urls_queued(&self) {
        self.urls_queued.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_active_tasks(&self) {
        self.active_tasks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrement_active_tasks(&self) {
        self.active_tasks.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn record_fetch_time(&self, duration: Duration) {
        self.total_fetch_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn record_saved(&self, bytes: usize) {
        self.urls_processed.fetch_add(1, Ordering::SeqCst);
        self.files_written.fetch_add(1, Ordering::SeqCst);
        self.bytes_written.fetch_add(bytes as u64, Ordering::SeqCst);
    }

    pub fn record_failure(&self, error: &UrlError) {
        self.urls_processed.fetch_add(1, Ordering::SeqCst);
        let counter = match error {
            UrlError::Network { .. } => &self.network_errors,
            UrlError::HttpStatus { .. } => &self.status_errors,
            UrlError::Read { .. } => &self.read_errors,
            UrlError::Write { .. } => &self.write_errors,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let processed = self.urls_processed.load(Ordering::SeqCst);
        let written = self.files_written.load(Ordering::SeqCst);
        let total_time = self.total_fetch_time_ms.load(Ordering::SeqCst);

        let success_rate = if processed > 0 {
            (written as f64 / processed as f64) * 100.0
        } else {
            0.0
        };

        let avg_fetch_time_ms = if processed > 0 {
            total_time / processed
        } else {
            0
        };

        MetricsSnapshot {
            urls_queued: self.urls_queued.load(Ordering::SeqCst),
            urls_processed: processed,
            files_written: written,
            bytes_written: self.bytes_written.load(Ordering::SeqCst),
            network_errors: self.network_errors.load(Ordering::SeqCst),
            status_errors: self.status_errors.load(Ordering::SeqCst),
            read_errors: self.read_errors.load(Ordering::SeqCst),
            write_errors: self.write_errors.load(Ordering::SeqCst),
            active_tasks: self.active_tasks.load(Ordering::SeqCst),
            success_rate,
            avg_fetch_time_ms,
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::path::PathBuf;
    use url::Url;

    #[test]
    fn failures_are_counted_by_kind() {
        let metrics = MetricsCollector::new();
        let url = Url::parse("https://example.com/").unwrap();

        metrics.record_saved(10);
        metrics.record_failure(&UrlError::HttpStatus {
            url: url.clone(),
            status: StatusCode::NOT_FOUND,
        });
        metrics.record_failure(&UrlError::Write {
            url,
            path: PathBuf::from("x"),
            source: std::io::Error::other("disk full"),
        });

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.urls_processed, 3);
        assert_eq!(snapshot.files_written, 1);
        assert_eq!(snapshot.bytes_written, 10);
        assert_eq!(snapshot.status_errors, 1);
        assert_eq!(snapshot.write_errors, 1);
        assert_eq!(snapshot.failures(), 2);
        assert!((snapshot.success_rate - 100.0 / 3.0).abs() < 1e-9);
    }
}
