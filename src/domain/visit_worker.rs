//! Background worker applying queued visit events to the store.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::application::services::UrlService;
use crate::domain::visit_event::VisitEvent;

/// Concurrency and timeout limits for [`run_visit_worker`].
#[derive(Debug, Clone, Copy)]
pub struct VisitWorkerSettings {
    /// Maximum number of increments in flight.
    pub concurrency: usize,
    /// Upper bound for a single increment against the store.
    pub timeout: Duration,
}

impl Default for VisitWorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Duration::from_millis(2000),
        }
    }
}

/// Consumes visit events until the channel closes.
///
/// At most `settings.concurrency` increments run at once; each is abandoned
/// after `settings.timeout`. Increments are never retried, since a retry after
/// an ambiguous failure could count a visit twice.
///
/// When every sender has been dropped the worker stops receiving and waits
/// for in-flight increments before returning.
pub async fn run_visit_worker(
    mut rx: mpsc::Receiver<VisitEvent>,
    service: Arc<UrlService>,
    settings: VisitWorkerSettings,
) {
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    info!(
        "Visit worker started (concurrency {}, timeout {:?})",
        settings.concurrency, settings.timeout
    );

    while let Some(event) = rx.recv().await {
        while let Some(result) = tasks.try_join_next() {
            log_task_result(result);
        }

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let service = service.clone();
        let limit = settings.timeout;
        tasks.spawn(async move {
            let _permit = permit;
            match timeout(limit, service.increment_visits(&event.code)).await {
                Ok(()) => {
                    metrics::counter!("shortener_visits_recorded_total").increment(1);
                    debug!(
                        "Processed visit for {} queued at {}",
                        event.code, event.at
                    );
                }
                Err(_) => {
                    metrics::counter!("shortener_visit_timeouts_total").increment(1);
                    warn!(
                        "Visit increment for {} timed out after {:?}",
                        event.code, limit
                    );
                }
            }
        });
    }

    info!(
        "Visit channel closed, draining {} in-flight increments",
        tasks.len()
    );
    while let Some(result) = tasks.join_next().await {
        log_task_result(result);
    }
    info!("Visit worker stopped");
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("Visit task failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::ServiceSettings;
    use crate::domain::entities::Expiry;
    use crate::domain::repositories::{KeyTtl, MappingStore, StoreResult, Ttl};
    use crate::infrastructure::store::MemoryStore;
    use async_trait::async_trait;

    async fn service_with_link(store: Arc<dyn MappingStore>) -> (Arc<UrlService>, String) {
        let service = Arc::new(UrlService::new(store, ServiceSettings::default()));
        let mapping = service
            .create_short_url("https://example.com".to_string(), None, Expiry::Default)
            .await
            .unwrap();
        (service, mapping.code.into_inner())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_worker_applies_all_events() {
        let (service, code) = service_with_link(Arc::new(MemoryStore::new())).await;
        let (tx, rx) = mpsc::channel(1000);

        let worker = tokio::spawn(run_visit_worker(
            rx,
            service.clone(),
            VisitWorkerSettings::default(),
        ));

        for _ in 0..250 {
            tx.send(VisitEvent::new(code.clone())).await.unwrap();
        }
        drop(tx);
        worker.await.unwrap();

        let info = service.get_url(&code).await.unwrap();
        assert_eq!(info.visits, 250);
    }

    #[tokio::test]
    async fn test_worker_stops_when_channel_closes() {
        let (service, _) = service_with_link(Arc::new(MemoryStore::new())).await;
        let (tx, rx) = mpsc::channel::<VisitEvent>(10);
        drop(tx);

        let finished = timeout(
            Duration::from_secs(1),
            run_visit_worker(rx, service, VisitWorkerSettings::default()),
        )
        .await;

        assert!(finished.is_ok());
    }

    /// Store whose counter increments never complete in time.
    struct SlowIncrStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl MappingStore for SlowIncrStore {
        async fn set(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<()> {
            self.inner.set(key, value, ttl).await
        }

        async fn set_if_absent(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<bool> {
            self.inner.set_if_absent(key, value, ttl).await
        }

        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn get_many(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
            self.inner.get_many(keys).await
        }

        async fn exists(&self, key: &str) -> StoreResult<bool> {
            self.inner.exists(key).await
        }

        async fn incr(&self, key: &str) -> StoreResult<i64> {
            tokio::time::sleep(self.delay).await;
            self.inner.incr(key).await
        }

        async fn delete(&self, key: &str) -> StoreResult<bool> {
            self.inner.delete(key).await
        }

        async fn expire(&self, key: &str, ttl: Ttl) -> StoreResult<bool> {
            self.inner.expire(key, ttl).await
        }

        async fn ttl(&self, key: &str) -> StoreResult<KeyTtl> {
            self.inner.ttl(key).await
        }

        async fn ping(&self) -> StoreResult<()> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_slow_increments_are_abandoned() {
        let store = Arc::new(SlowIncrStore {
            inner: MemoryStore::new(),
            delay: Duration::from_secs(30),
        });
        let (service, code) = service_with_link(store).await;
        let (tx, rx) = mpsc::channel(10);

        let settings = VisitWorkerSettings {
            concurrency: 2,
            timeout: Duration::from_millis(50),
        };
        let worker = tokio::spawn(run_visit_worker(rx, service.clone(), settings));

        for _ in 0..4 {
            tx.send(VisitEvent::new(code.clone())).await.unwrap();
        }
        drop(tx);

        let finished = timeout(Duration::from_secs(5), worker).await;
        assert!(finished.is_ok(), "worker should not wait for stuck increments");

        let info = service.get_url(&code).await.unwrap();
        assert_eq!(info.visits, 0);
    }
}
