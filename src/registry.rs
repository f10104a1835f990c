use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-host count of successfully written responses for one run.
///
/// Each host has its own counter lock. A [`Reservation`] holds that lock from
/// the moment the next ordinal is read until it is committed or dropped, so
/// reading `count + 1` and recording it form a single step. Different hosts
/// never contend with each other.
#[derive(Default)]
pub struct HostRegistry {
    hosts: Mutex<HashMap<String, Arc<Mutex<u64>>>>,
}

/// Exclusive claim on the next ordinal of a host.
///
/// Dropping it without calling [`Reservation::commit`] leaves the count
/// untouched, so a failed write consumes no ordinal.
pub struct Reservation {
    count: OwnedMutexGuard<u64>,
}

impl Reservation {
    pub fn ordinal(&self) -> u64 {
        *self.count + 1
    }

    /// Records the reserved ordinal as the new count and returns it.
    pub fn commit(mut self) -> u64 {
        *self.count += 1;
        *self.count
    }
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `host`'s counter. An unseen host starts
    /// at ordinal 1.
    pub async fn reserve(&self, host: &str) -> Reservation {
        let counter = {
            let mut hosts = self.hosts.lock().await;
            hosts.entry(host.to_string()).or_default().clone()
        };
        Reservation {
            count: counter.lock_owned().await,
        }
    }

    /// Atomic fetch-and-increment: returns `previous + 1` and records it.
    pub async fn next_ordinal_and_reserve(&self, host: &str) -> u64 {
        self.reserve(host).await.commit()
    }

    pub async fn count(&self, host: &str) -> u64 {
        let counter = self.hosts.lock().await.get(host).cloned();
        match counter {
            Some(counter) => *counter.lock().await,
            None => 0,
        }
    }

    pub async fn snapshot(&self) -> HashMap<String, u64> {
        let counters: Vec<_> = self
            .hosts
            .lock()
            .await
            .iter()
            .map(|(host, counter)| (host.clone(), counter.clone()))
            .collect();

        let mut counts = HashMap::with_capacity(counters.len());
        for (host, counter) in counters {
            counts.insert(host, *counter.lock().await);
        }
        counts
    }
}
