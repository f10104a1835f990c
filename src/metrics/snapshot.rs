use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub urls_queued: u64,
    pub urls_processed: u64,
    pub files_written: u64,
    pub bytes_written: u64,
    pub network_errors: u64,
    pub status_errors: u64,
    pub read_errors: u64,
    pub write_errors: u64,
    pub active_tasks: u64,
    pub success_rate: f64,
    pub avg_fetch_time_ms: u64,
    pub elapsed_seconds: f64,
}

impl MetricsSnapshot {
    pub fn failures(&self) -> u64 {
        self.network_errors + self.status_errors + self.read_errors + self.write_errors
    }
}
