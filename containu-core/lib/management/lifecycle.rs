//! Lifecycle operations for containers, images, networks and volumes.
//!
//! Each call is one round trip: it waits out the configured latency, then applies a single
//! mutation to the store. Container operations additionally hold that container's lock for the
//! whole call, so two operations on one id never interleave.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use containu_utils::LOG_BACKLOG_SIZE;
use getset::Getters;
use rand::Rng;
use uuid::Uuid;

use crate::{
    catalog::ContentProvider,
    config::LifecycleConfig,
    models::{
        Container, ContainerImage, ContainerOptions, ContainerStatus, LogEntry, LogLevel,
        MetricKind, MetricPoint, MetricSample, Network, Volume, CREATED_JUST_NOW, MEMORY_IDLE,
        UPTIME_IDLE, UPTIME_JUST_STARTED,
    },
    store::{ResourceStore, StoreSnapshot},
    ContainuError, ContainuResult,
};

use super::ResourceLocks;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Spacing of the entries written by a log backfill, in seconds.
const BACKLOG_SPACING_SECS: i64 = 5;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Performs lifecycle operations against a [`ResourceStore`].
///
/// Cloning is cheap; clones share the store, the content provider and the lock table.
#[derive(Clone, Getters)]
pub struct LifecycleService {
    /// The store this service mutates
    #[getset(get = "pub with_prefix")]
    store: Arc<ResourceStore>,

    /// Latency, pacing and failure settings
    #[getset(get = "pub with_prefix")]
    config: LifecycleConfig,

    provider: Arc<dyn ContentProvider>,
    locks: Arc<ResourceLocks>,
}

/// What a start or stop did to the container.
enum Transition {
    Applied(String),
    Unchanged,
    Failed(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LifecycleService {
    /// Creates a service over `store`, drawing filler content from `provider`.
    pub fn new(
        store: Arc<ResourceStore>,
        provider: Arc<dyn ContentProvider>,
        config: LifecycleConfig,
    ) -> ContainuResult<Self> {
        config.validate()?;

        Ok(Self {
            store,
            config,
            provider,
            locks: Arc::new(ResourceLocks::new()),
        })
    }

    /// Creates a service over a fresh store seeded from `provider`.
    pub fn seeded(
        provider: Arc<dyn ContentProvider>,
        config: LifecycleConfig,
    ) -> ContainuResult<Self> {
        let store = Arc::new(ResourceStore::seeded(provider.as_ref(), &config)?);
        Self::new(store, provider, config)
    }

    /// Returns a consistent snapshot of the store.
    pub fn snapshot(&self) -> ContainuResult<StoreSnapshot> {
        self.store.snapshot()
    }

    //----------------------------------------------------------------------------------------------
    // Containers
    //----------------------------------------------------------------------------------------------

    /// Creates a stopped container.
    ///
    /// ## Errors
    /// Fails with [`ContainuError::DuplicateName`] if a container with the same name exists.
    #[tracing::instrument(skip(self, options), fields(name = %options.name, image = %options.image))]
    pub async fn create(&self, options: ContainerOptions) -> ContainuResult<Container> {
        self.round_trip().await;

        let container = Container::builder()
            .name(options.name)
            .image(options.image)
            .ports(options.ports)
            .networks(options.networks)
            .volumes(options.volumes)
            .build();

        let created = container.clone();
        self.store
            .mutate(|state| state.insert_container(container))?;

        tracing::info!(id = %created.id, "created container");
        Ok(created)
    }

    /// Starts a stopped or failed container.
    ///
    /// Starting a running container does nothing and writes no logs.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self, id: Uuid) -> ContainuResult<()> {
        let _guard = self.locks.acquire(id).await?;
        self.start_locked(id).await
    }

    /// Stops a running or failed container.
    ///
    /// Stopping a stopped container does nothing and writes no logs.
    #[tracing::instrument(skip(self))]
    pub async fn stop(&self, id: Uuid) -> ContainuResult<()> {
        let _guard = self.locks.acquire(id).await?;
        self.stop_locked(id).await
    }

    /// Stops then starts a container, pausing in between.
    ///
    /// The container's lock is held throughout. If the stop fails the start is not attempted.
    #[tracing::instrument(skip(self))]
    pub async fn restart(&self, id: Uuid) -> ContainuResult<()> {
        let _guard = self.locks.acquire(id).await?;

        self.stop_locked(id).await?;
        tokio::time::sleep(self.config.get_restart_pause()).await;
        self.start_locked(id).await
    }

    /// Deletes a container together with its logs, metrics and selection entries.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ContainuResult<Container> {
        let _guard = self.locks.acquire(id).await?;
        self.round_trip().await;

        let container = self.store.mutate(|state| state.remove_container(id))?;
        tracing::info!(name = %container.name, "deleted container");
        Ok(container)
    }

    async fn start_locked(&self, id: Uuid) -> ContainuResult<()> {
        self.round_trip().await;

        let failed = self.roll_failure();
        let (cpu, memory) = {
            let mut rng = rand::rng();
            let cpu: f64 = rng.random_range(1.0..=15.0);
            ((cpu * 10.0).round() / 10.0, rng.random_range(64..=512u32))
        };
        let now = Utc::now();

        let transition = self.store.mutate(|state| {
            let container = state.container_mut(id)?;
            let name = container.name.clone();

            match container.status {
                ContainerStatus::Running => return Ok(Transition::Unchanged),
                ContainerStatus::Pulling => {
                    return Err(ContainuError::InvalidTransition {
                        name,
                        status: container.status,
                        action: "start",
                    })
                }
                ContainerStatus::Stopped | ContainerStatus::Error => {}
            }

            if failed {
                container.status = ContainerStatus::Error;
                let message = format!("Container {} failed to start", name);
                state.append_log(id, LogEntry::at(now, message, LogLevel::Error))?;
                return Ok(Transition::Failed(name));
            }

            container.status = ContainerStatus::Running;
            container.uptime = UPTIME_JUST_STARTED.to_string();
            container.cpu_usage = cpu;
            container.memory_usage = format!("{} MB", memory);

            let starting = format!("Container {} starting...", name);
            let started = format!("Container {} started successfully", name);
            state.append_log(id, LogEntry::at(now, starting, LogLevel::Info))?;
            state.append_log(
                id,
                LogEntry::at(now + TimeDelta::seconds(1), started, LogLevel::Info),
            )?;

            Ok(Transition::Applied(name))
        })?;

        match transition {
            Transition::Applied(name) => {
                tracing::info!(%name, "container started");
                Ok(())
            }
            Transition::Unchanged => {
                tracing::debug!("container already running");
                Ok(())
            }
            Transition::Failed(name) => {
                tracing::warn!(%name, "container failed to start");
                Err(ContainuError::OperationFailed {
                    name,
                    action: "start",
                })
            }
        }
    }

    async fn stop_locked(&self, id: Uuid) -> ContainuResult<()> {
        self.round_trip().await;

        let failed = self.roll_failure();
        let now = Utc::now();

        let transition = self.store.mutate(|state| {
            let container = state.container_mut(id)?;
            let name = container.name.clone();

            match container.status {
                ContainerStatus::Stopped => return Ok(Transition::Unchanged),
                ContainerStatus::Pulling => {
                    return Err(ContainuError::InvalidTransition {
                        name,
                        status: container.status,
                        action: "stop",
                    })
                }
                ContainerStatus::Running | ContainerStatus::Error => {}
            }

            if failed {
                container.status = ContainerStatus::Error;
                let message = format!("Container {} failed to stop", name);
                state.append_log(id, LogEntry::at(now, message, LogLevel::Error))?;
                return Ok(Transition::Failed(name));
            }

            container.status = ContainerStatus::Stopped;
            container.uptime = UPTIME_IDLE.to_string();
            container.cpu_usage = 0.0;
            container.memory_usage = MEMORY_IDLE.to_string();

            let stopping = format!("Container {} stopping...", name);
            let stopped = format!("Container {} stopped", name);
            state.append_log(id, LogEntry::at(now, stopping, LogLevel::Info))?;
            state.append_log(
                id,
                LogEntry::at(now + TimeDelta::seconds(1), stopped, LogLevel::Info),
            )?;

            Ok(Transition::Applied(name))
        })?;

        match transition {
            Transition::Applied(name) => {
                tracing::info!(%name, "container stopped");
                Ok(())
            }
            Transition::Unchanged => {
                tracing::debug!("container already stopped");
                Ok(())
            }
            Transition::Failed(name) => {
                tracing::warn!(%name, "container failed to stop");
                Err(ContainuError::OperationFailed {
                    name,
                    action: "stop",
                })
            }
        }
    }

    //----------------------------------------------------------------------------------------------
    // Logs, stats and exec
    //----------------------------------------------------------------------------------------------

    /// Returns the most recent `tail` log entries of a container, oldest first.
    ///
    /// An empty buffer is first backfilled with a backlog drawn from the content provider.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_logs(&self, id: Uuid, tail: usize) -> ContainuResult<Vec<LogEntry>> {
        let _guard = self.locks.acquire(id).await?;
        self.round_trip().await;

        let backlog = self.backlog();
        let logs = self.store.mutate(|state| {
            if !state.has_logs(id) {
                for entry in backlog {
                    state.append_log(id, entry)?;
                }
            }

            state.logs(id)
        })?;

        let skip = logs.len().saturating_sub(tail);
        Ok(logs.into_iter().skip(skip).collect())
    }

    /// Takes one usage reading of a container and records it.
    #[tracing::instrument(skip(self))]
    pub async fn stats(&self, id: Uuid) -> ContainuResult<MetricSample> {
        self.round_trip().await;

        let sample = MetricSample::random(Utc::now());
        self.store.append_metric(id, sample.clone())?;

        Ok(sample)
    }

    /// Returns one series of a container's recorded usage readings, oldest first.
    pub fn metric_series(&self, id: Uuid, kind: MetricKind) -> ContainuResult<Vec<MetricPoint>> {
        Ok(self
            .store
            .metrics(id)?
            .iter()
            .map(|sample| sample.point(kind))
            .collect())
    }

    /// Runs a shell command inside a running container and returns its output.
    ///
    /// ## Errors
    /// Fails with [`ContainuError::NotRunning`] if the container is not running.
    #[tracing::instrument(skip(self))]
    pub async fn exec(&self, id: Uuid, command: &str) -> ContainuResult<String> {
        self.round_trip().await;

        let container = self.store.container(id)?;
        if !container.is_running() {
            return Err(ContainuError::NotRunning(container.name));
        }

        Ok(self.provider.shell_output(command))
    }

    //----------------------------------------------------------------------------------------------
    // Images
    //----------------------------------------------------------------------------------------------

    /// Pulls an image. Pulling an existing `repository:tag` adds another entry.
    #[tracing::instrument(skip(self))]
    pub async fn pull(&self, repository: &str, tag: &str) -> ContainuResult<ContainerImage> {
        self.round_trip().await;

        let size = rand::rng().random_range(50..=500u32);
        let image = ContainerImage::builder()
            .repository(repository)
            .tag(tag)
            .size(format!("{} MB", size))
            .created(CREATED_JUST_NOW)
            .build();

        let pulled = image.clone();
        self.store.mutate(|state| {
            state.insert_image(image);
            Ok(())
        })?;

        tracing::info!(id = %pulled.id, "pulled image");
        Ok(pulled)
    }

    /// Removes an image. Removing an absent image does nothing and returns `None`.
    #[tracing::instrument(skip(self))]
    pub async fn remove_image(&self, id: Uuid) -> ContainuResult<Option<ContainerImage>> {
        let _guard = self.locks.acquire(id).await?;
        self.round_trip().await;

        self.store.mutate(|state| Ok(state.remove_image(id)))
    }

    //----------------------------------------------------------------------------------------------
    // Networks
    //----------------------------------------------------------------------------------------------

    /// Creates a local, attachable network with a random `172.x.0.0/16` subnet.
    #[tracing::instrument(skip(self))]
    pub async fn create_network(&self, name: &str, driver: &str) -> ContainuResult<Network> {
        self.round_trip().await;

        let octet = rand::rng().random_range(20..=30u8);
        let network = Network::builder()
            .name(name)
            .driver(driver)
            .subnet(format!("172.{}.0.0/16", octet))
            .build();

        let created = network.clone();
        self.store.mutate(|state| {
            state.insert_network(network);
            Ok(())
        })?;

        tracing::info!(id = %created.id, "created network");
        Ok(created)
    }

    /// Removes a network. Removing an absent network does nothing and returns `None`.
    ///
    /// ## Errors
    /// Fails with [`ContainuError::BuiltinNetwork`] for `bridge`, `host` and `none`.
    #[tracing::instrument(skip(self))]
    pub async fn remove_network(&self, id: Uuid) -> ContainuResult<Option<Network>> {
        let _guard = self.locks.acquire(id).await?;
        self.round_trip().await;

        self.store.mutate(|state| state.remove_network(id))
    }

    //----------------------------------------------------------------------------------------------
    // Volumes
    //----------------------------------------------------------------------------------------------

    /// Creates an empty volume mounted under the engine's volume directory.
    #[tracing::instrument(skip(self))]
    pub async fn create_volume(&self, name: &str, driver: &str) -> ContainuResult<Volume> {
        self.round_trip().await;

        let volume = Volume::builder()
            .name(name)
            .driver(driver)
            .mount_point(format!("/var/lib/docker/volumes/{}/_data", name))
            .build();

        let created = volume.clone();
        self.store.mutate(|state| {
            state.insert_volume(volume);
            Ok(())
        })?;

        tracing::info!(id = %created.id, "created volume");
        Ok(created)
    }

    /// Removes a volume. Removing an absent volume does nothing and returns `None`.
    #[tracing::instrument(skip(self))]
    pub async fn remove_volume(&self, id: Uuid) -> ContainuResult<Option<Volume>> {
        let _guard = self.locks.acquire(id).await?;
        self.round_trip().await;

        self.store.mutate(|state| Ok(state.remove_volume(id)))
    }

    //----------------------------------------------------------------------------------------------
    // Helpers
    //----------------------------------------------------------------------------------------------

    pub(crate) fn provider(&self) -> &Arc<dyn ContentProvider> {
        &self.provider
    }

    async fn round_trip(&self) {
        let latency = self.config.get_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn roll_failure(&self) -> bool {
        let rate = self.config.get_failure_rate();
        rate > 0.0 && rand::rng().random_bool(rate)
    }

    fn backlog(&self) -> Vec<LogEntry> {
        let pool = self.provider.backlog_messages();
        if pool.is_empty() {
            return Vec::new();
        }

        let mut rng = rand::rng();
        let newest = Utc::now();
        (0..LOG_BACKLOG_SIZE)
            .rev()
            .map(|age| {
                let (message, level) = &pool[rng.random_range(0..pool.len())];
                let timestamp = newest - TimeDelta::seconds(age as i64 * BACKLOG_SPACING_SECS);
                LogEntry::at(timestamp, message.clone(), *level)
            })
            .collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
