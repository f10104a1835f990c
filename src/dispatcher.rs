use crate::error::UrlError;
use crate::fetcher::Fetcher;
use crate::metrics::collector::MetricsCollector;
use crate::metrics::snapshot::MetricsSnapshot;
use crate::output::{ManifestEntry, OutputHandler};
use crate::registry::HostRegistry;
use crate::writer::{ResponseWriter, SavedResponse};
use futures::stream::StreamExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tokio::task::JoinSet;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Running,
    Finished,
}

/// Result of one run. Per-URL failures are collected here, never raised.
#[derive(Debug)]
pub struct RunReport {
    /// Wall-clock time from the run's start instant until every task joined
    pub elapsed: Duration,
    pub saved: Vec<SavedResponse>,
    pub failures: Vec<UrlError>,
    /// Final visit count per host
    pub hosts: HashMap<String, u64>,
}

pub struct Dispatcher {
    fetcher: Fetcher,
    concurrency: Option<usize>,
    metrics: Arc<MetricsCollector>,
    output: Option<Arc<Mutex<Box<dyn OutputHandler>>>>,
    state_watcher: watch::Sender<DispatcherState>,
}

impl Dispatcher {
    pub fn new(fetcher: Fetcher, metrics: Option<Arc<MetricsCollector>>) -> Self {
        let (state_tx, _) = watch::channel(DispatcherState::Idle);

        Self {
            fetcher,
            concurrency: None,
            metrics: metrics.unwrap_or_else(|| Arc::new(MetricsCollector::new())),
            output: None,
            state_watcher: state_tx,
        }
    }

    /// Caps the number of URLs in flight. Without it every URL gets its own
    /// task immediately.
    pub fn with_concurrency(mut self, limit: Option<usize>) -> Self {
        self.concurrency = limit;
        self
    }

    pub fn with_output(mut self, output: Box<dyn OutputHandler>) -> Self {
        self.output = Some(Arc::new(Mutex::new(output)));
        self
    }

    /// Fetches every URL in its own task and saves each `200 OK` body under
    /// `destination`. Returns once all tasks have finished; a failing URL
    /// never stops its siblings.
    pub async fn run(&self, urls: Vec<Url>, destination: &Path) -> RunReport {
        self.run_since(Instant::now(), urls, destination).await
    }

    /// Same as [`Dispatcher::run`], with the reported elapsed time measured
    /// from `started`, e.g. the moment the URL list was read.
    pub async fn run_since(&self, started: Instant, urls: Vec<Url>, destination: &Path) -> RunReport {
        self.set_state(DispatcherState::Running);

        let registry = Arc::new(HostRegistry::new());
        let writer = Arc::new(ResponseWriter::new(destination, registry.clone()));
        let limiter = self.concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let (entries_tx, entries_rx) = mpsc::channel::<ManifestEntry>(100);

        // Manifest processor
        let output = self.output.clone();
        let processor = tokio::spawn(async move {
            tokio_stream::wrappers::ReceiverStream::new(entries_rx)
                .for_each(|entry| {
                    let output = output.clone();
                    async move {
                        if let Some(output) = output {
                            if let Err(e) = output.lock().await.write(entry).await {
                                log::error!("Error writing manifest entry: {}", e);
                            }
                        }
                    }
                })
                .await;

            if let Some(output) = &output {
                if let Err(e) = output.lock().await.close().await {
                    log::error!("Error closing manifest: {}", e);
                }
            }
        });

        let mut tasks = JoinSet::new();
        for url in urls {
            self.metrics.increment_urls_queued();
            let fetcher = self.fetcher.clone();
            let writer = writer.clone();
            let limiter = limiter.clone();
            let metrics = self.metrics.clone();
            let entries_tx = entries_tx.clone();

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                metrics.increment_active_tasks();

                let result = save_response(&fetcher, &writer, &metrics, &url).await;
                let entry = match &result {
                    Ok(saved) => {
                        log::info!(
                            "Response from \"{}\" saved to {}",
                            saved.url,
                            saved.path.display()
                        );
                        metrics.record_saved(saved.bytes);
                        ManifestEntry::from(saved)
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        metrics.record_failure(e);
                        ManifestEntry::from(e)
                    }
                };
                let _ = entries_tx.send(entry).await;

                metrics.decrement_active_tasks();
                result
            });
        }
        drop(entries_tx);

        let mut saved = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(response)) => saved.push(response),
                Ok(Err(e)) => failures.push(e),
                Err(e) => log::error!("Task aborted: {}", e),
            }
        }

        if let Err(e) = processor.await {
            log::error!("Manifest task aborted: {}", e);
        }

        self.set_state(DispatcherState::Finished);
        RunReport {
            elapsed: started.elapsed(),
            saved,
            failures,
            hosts: registry.snapshot().await,
        }
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn watch_metrics(&self) -> watch::Receiver<MetricsSnapshot> {
        let (tx, rx) = watch::channel(self.metrics.snapshot());
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            loop {
                interval.tick().await;
                if tx.send(metrics.snapshot()).is_err() {
                    break;
                }
            }
        });
        rx
    }

    pub fn watch_state(&self) -> watch::Receiver<DispatcherState> {
        self.state_watcher.subscribe()
    }

    pub fn state(&self) -> DispatcherState {
        *self.state_watcher.borrow()
    }

    fn set_state(&self, state: DispatcherState) {
        self.state_watcher.send_replace(state);
    }
}

async fn save_response(
    fetcher: &Fetcher,
    writer: &ResponseWriter,
    metrics: &MetricsCollector,
    url: &Url,
) -> Result<SavedResponse, UrlError> {
    let start_time = Instant::now();
    let body = fetcher.fetch(url).await;
    metrics.record_fetch_time(start_time.elapsed());
    writer.write(url, &body?).await
}
