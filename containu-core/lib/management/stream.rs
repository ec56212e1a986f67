//! Time-paced, bounded, cancellable producers of log entries and usage samples.
//!
//! A stream sleeps one pacing interval before each item, records the item in the store, then
//! yields it. It ends after its configured count, when its token is cancelled, or as soon as its
//! container disappears. Cancellation is a normal end, not an error, and nothing is written to
//! the store once the token has fired.

use chrono::{DateTime, TimeDelta, Utc};
use futures::{Stream, StreamExt};
use rand::Rng;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    models::{LogEntry, MetricSample},
    ContainuResult,
};

use super::LifecycleService;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Items buffered between a spawned producer and its subscriber.
const SUBSCRIPTION_BUFFER: usize = 16;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Produces live log and stats streams for containers.
///
/// Every call starts a fresh bounded sequence; streams are not restartable.
#[derive(Clone)]
pub struct StreamEmitter {
    service: LifecycleService,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl StreamEmitter {
    /// Creates an emitter over the store and settings of `service`.
    pub fn new(service: LifecycleService) -> Self {
        Self { service }
    }

    /// Returns a lazy stream of log entries for a container.
    ///
    /// Entries are drawn from the content provider's stream pool and appended to the
    /// container's log buffer as they are produced.
    ///
    /// ## Errors
    /// Fails with [`ContainuError::NotFound`](crate::ContainuError::NotFound) if the container
    /// does not exist when the stream is requested.
    pub fn stream_logs(
        &self,
        id: Uuid,
        token: CancellationToken,
    ) -> ContainuResult<impl Stream<Item = LogEntry> + Send + 'static> {
        self.service.get_store().container(id)?;

        let store = self.service.get_store().clone();
        let pool = self.service.provider().stream_messages();
        let interval = self.service.get_config().get_stream_interval();
        let count = if pool.is_empty() {
            0
        } else {
            self.service.get_config().get_log_stream_count()
        };

        tracing::debug!(%id, count, "log stream opened");

        Ok(async_stream::stream! {
            for emitted in 0..count {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(%id, emitted, "log stream cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                let message = pool[rand::rng().random_range(0..pool.len())].clone();
                let entry = LogEntry::info(message);
                if let Err(e) = store.append_log(id, entry.clone()) {
                    tracing::debug!(%id, emitted, "log stream stopped: {}", e);
                    break;
                }

                yield entry;
            }
        })
    }

    /// Returns a lazy stream of usage samples for a container.
    ///
    /// Readings stay within the usual bounds, timestamps strictly increase, and each sample is
    /// appended to the container's metric series as it is produced.
    ///
    /// ## Errors
    /// Fails with [`ContainuError::NotFound`](crate::ContainuError::NotFound) if the container
    /// does not exist when the stream is requested.
    pub fn stream_stats(
        &self,
        id: Uuid,
        token: CancellationToken,
    ) -> ContainuResult<impl Stream<Item = MetricSample> + Send + 'static> {
        self.service.get_store().container(id)?;

        let store = self.service.get_store().clone();
        let interval = self.service.get_config().get_stream_interval();
        let count = self.service.get_config().get_stats_stream_count();

        tracing::debug!(%id, count, "stats stream opened");

        Ok(async_stream::stream! {
            let mut last: Option<DateTime<Utc>> = None;

            for emitted in 0..count {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(%id, emitted, "stats stream cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                let timestamp = next_timestamp(last);
                last = Some(timestamp);

                let sample = MetricSample::random(timestamp);
                if let Err(e) = store.append_metric(id, sample.clone()) {
                    tracing::debug!(%id, emitted, "stats stream stopped: {}", e);
                    break;
                }

                yield sample;
            }
        })
    }

    /// Runs a log stream on a background task and returns its receiving end.
    ///
    /// Dropping the receiver stops the producer before its next store write.
    pub fn subscribe_logs(
        &self,
        id: Uuid,
        token: CancellationToken,
    ) -> ContainuResult<ReceiverStream<LogEntry>> {
        let token = token.child_token();
        let stream = self.stream_logs(id, token.clone())?;
        Ok(forward(stream, token))
    }

    /// Runs a stats stream on a background task and returns its receiving end.
    ///
    /// Dropping the receiver stops the producer before its next store write.
    pub fn subscribe_stats(
        &self,
        id: Uuid,
        token: CancellationToken,
    ) -> ContainuResult<ReceiverStream<MetricSample>> {
        let token = token.child_token();
        let stream = self.stream_stats(id, token.clone())?;
        Ok(forward(stream, token))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn next_timestamp(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match last {
        Some(last) if now <= last => last + TimeDelta::microseconds(1),
        _ => now,
    }
}

fn forward<S, T>(stream: S, token: CancellationToken) -> ReceiverStream<T>
where
    S: Stream<Item = T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

    tokio::spawn(async move {
        let mut stream = std::pin::pin!(stream);
        loop {
            // A closed receiver must win over a pending item so nothing more reaches the store.
            let item = tokio::select! {
                biased;
                _ = tx.closed() => None,
                item = stream.next() => item,
            };

            let Some(item) = item else {
                break;
            };

            if tx.send(item).await.is_err() {
                break;
            }
        }

        token.cancel();
    });

    ReceiverStream::new(rx)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        catalog::{ContentProvider, DemoCatalog},
        config::LifecycleConfig,
        models::{Container, ContainerImage, LogLevel, Network, Volume},
    };

    fn emitter_with(provider: Arc<dyn ContentProvider>) -> (StreamEmitter, LifecycleService) {
        let config = LifecycleConfig::builder()
            .latency(Duration::ZERO)
            .stream_interval(Duration::from_millis(1))
            .log_stream_count(5)
            .stats_stream_count(8)
            .metric_capacity(4)
            .build();
        let service = LifecycleService::seeded(provider, config).unwrap();
        (StreamEmitter::new(service.clone()), service)
    }

    fn id_of(service: &LifecycleService, name: &str) -> Uuid {
        service
            .snapshot()
            .unwrap()
            .container_by_name(name)
            .unwrap()
            .id
    }

    #[test_log::test(tokio::test)]
    async fn test_log_stream_appends_what_it_yields() {
        let (emitter, service) = emitter_with(Arc::new(DemoCatalog));
        let id = id_of(&service, "db-main");

        let entries: Vec<_> = emitter
            .stream_logs(id, CancellationToken::new())
            .unwrap()
            .collect()
            .await;

        assert_eq!(entries.len(), 5);
        assert_eq!(service.get_store().logs(id).unwrap(), entries);
        let pool = DemoCatalog.stream_messages();
        assert!(entries.iter().all(|e| pool.contains(&e.message)));
    }

    #[test_log::test(tokio::test)]
    async fn test_stats_stream_keeps_latest_samples() {
        let (emitter, service) = emitter_with(Arc::new(DemoCatalog));
        let id = id_of(&service, "db-main");

        let samples: Vec<_> = emitter
            .stream_stats(id, CancellationToken::new())
            .unwrap()
            .collect()
            .await;

        assert_eq!(samples.len(), 8);
        assert!(samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(service.get_store().metrics(id).unwrap(), samples[4..].to_vec());
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_of_missing_container_fails() {
        let (emitter, _) = emitter_with(Arc::new(DemoCatalog));
        let result = emitter.stream_logs(Uuid::new_v4(), CancellationToken::new());
        assert!(result.err().is_some_and(|e| e.is_not_found()));
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_ends_when_container_is_deleted() {
        let (emitter, service) = emitter_with(Arc::new(DemoCatalog));
        let id = id_of(&service, "db-main");

        let mut stream = std::pin::pin!(emitter.stream_stats(id, CancellationToken::new()).unwrap());
        assert!(stream.next().await.is_some());

        service.delete(id).await.unwrap();

        assert!(stream.next().await.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_empty_pool_yields_nothing() {
        struct Silent;

        impl ContentProvider for Silent {
            fn containers(&self) -> Vec<Container> {
                DemoCatalog.containers()
            }
            fn images(&self) -> Vec<ContainerImage> {
                Vec::new()
            }
            fn networks(&self) -> Vec<Network> {
                Vec::new()
            }
            fn volumes(&self) -> Vec<Volume> {
                Vec::new()
            }
            fn backlog_messages(&self) -> Vec<(String, LogLevel)> {
                Vec::new()
            }
            fn stream_messages(&self) -> Vec<String> {
                Vec::new()
            }
            fn shell_output(&self, _command: &str) -> String {
                String::new()
            }
        }

        let (emitter, service) = emitter_with(Arc::new(Silent));
        let id = id_of(&service, "db-main");

        let entries: Vec<_> = emitter
            .stream_logs(id, CancellationToken::new())
            .unwrap()
            .collect()
            .await;
        assert!(entries.is_empty());

        let backfilled = service.fetch_logs(id, 10).await.unwrap();
        assert!(backfilled.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_subscription_stops_when_receiver_dropped() {
        let config = LifecycleConfig::builder()
            .latency(Duration::ZERO)
            .stream_interval(Duration::from_millis(100))
            .log_stream_count(1000)
            .build();
        let service = LifecycleService::seeded(Arc::new(DemoCatalog), config).unwrap();
        let emitter = StreamEmitter::new(service.clone());
        let id = id_of(&service, "db-main");
        let parent = CancellationToken::new();

        let mut receiver = emitter.subscribe_logs(id, parent.clone()).unwrap();
        assert!(receiver.next().await.is_some());
        drop(receiver);

        let at_drop = service.get_store().logs(id).unwrap().len();
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(at_drop, 1);
        assert_eq!(service.get_store().logs(id).unwrap().len(), at_drop);
        assert!(!parent.is_cancelled());
    }

    #[test_log::test(tokio::test)]
    async fn test_stats_subscription_stops_when_receiver_dropped() {
        let config = LifecycleConfig::builder()
            .latency(Duration::ZERO)
            .stream_interval(Duration::from_millis(100))
            .build();
        let service = LifecycleService::seeded(Arc::new(DemoCatalog), config).unwrap();
        let emitter = StreamEmitter::new(service.clone());
        let id = id_of(&service, "db-main");

        let mut receiver = emitter
            .subscribe_stats(id, CancellationToken::new())
            .unwrap();
        assert!(receiver.next().await.is_some());
        assert!(receiver.next().await.is_some());
        drop(receiver);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(service.get_store().metrics(id).unwrap().len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_cancel_stops_stats_stream() {
        let (emitter, service) = emitter_with(Arc::new(DemoCatalog));
        let id = id_of(&service, "db-main");
        let token = CancellationToken::new();

        let mut stream = std::pin::pin!(emitter.stream_stats(id, token.clone()).unwrap());
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());

        token.cancel();

        assert!(stream.next().await.is_none());
        assert_eq!(service.get_store().metrics(id).unwrap().len(), 2);
    }
}
