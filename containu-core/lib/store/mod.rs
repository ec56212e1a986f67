//! The resource store: the single point of mutation for all resource state.
//!
//! Writes are serialized through one exclusive lock. Reads take a [`StoreSnapshot`] under
//! the same lock, so a reader never observes a half-applied transition. Every successful write
//! publishes a fresh snapshot to subscribers.

mod state;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use crate::{
    catalog::ContentProvider,
    config::LifecycleConfig,
    models::{Container, ContainerImage, LogEntry, MetricSample, Network, ResourceKind, Volume},
    view::Selection,
    ContainuError, ContainuResult,
};

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use state::*;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Owns the authoritative collections of containers, images, networks and volumes, plus the
/// per-container log and metric buffers.
#[derive(Debug)]
pub struct ResourceStore {
    state: RwLock<StoreState>,
    publisher: watch::Sender<Arc<StoreSnapshot>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ResourceStore {
    /// Creates an empty store with the buffer bounds from `config`.
    pub fn new(config: &LifecycleConfig) -> Self {
        let state = StoreState::new(config.get_log_capacity(), config.get_metric_capacity());
        let (publisher, _) = watch::channel(Arc::new(state.snapshot()));

        Self {
            state: RwLock::new(state),
            publisher,
        }
    }

    /// Creates a store holding the seed resources of `provider`.
    ///
    /// Containers are attached to the seeded networks and volumes they name.
    pub fn seeded(provider: &dyn ContentProvider, config: &LifecycleConfig) -> ContainuResult<Self> {
        let mut state = StoreState::new(config.get_log_capacity(), config.get_metric_capacity());

        for network in provider.networks() {
            state.insert_network(network);
        }

        for volume in provider.volumes() {
            state.insert_volume(volume);
        }

        for image in provider.images() {
            state.insert_image(image);
        }

        for container in provider.containers() {
            state.insert_container(container)?;
        }

        tracing::debug!(
            containers = state.get_containers().len(),
            images = state.get_images().len(),
            networks = state.get_networks().len(),
            volumes = state.get_volumes().len(),
            "seeded resource store"
        );

        let (publisher, _) = watch::channel(Arc::new(state.snapshot()));

        Ok(Self {
            state: RwLock::new(state),
            publisher,
        })
    }

    /// Returns a consistent point-in-time copy of all four collections and the selection.
    pub fn snapshot(&self) -> ContainuResult<StoreSnapshot> {
        Ok(self.read_state()?.snapshot())
    }

    /// Subscribes to snapshot updates.
    ///
    /// The receiver starts with the latest snapshot and sees a new one after every successful
    /// mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreSnapshot>> {
        self.publisher.subscribe()
    }

    /// Returns the snapshot updates as a stream, starting with the latest snapshot.
    pub fn updates(&self) -> WatchStream<Arc<StoreSnapshot>> {
        WatchStream::new(self.subscribe())
    }

    /// Applies `f` under exclusive access.
    ///
    /// On success the revision is bumped and a new snapshot is published before the lock is
    /// released. `f` must leave the state untouched when it returns an error; the mutators on
    /// [`StoreState`] all check before they write, and only this crate composes them.
    pub(crate) fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> ContainuResult<T>,
    ) -> ContainuResult<T> {
        let mut state = self.write_state()?;
        let value = f(&mut state)?;

        state.prune_selection();
        state.bump_revision();
        self.publisher.send_replace(Arc::new(state.snapshot()));

        Ok(value)
    }

    /// Reads from the state under shared access.
    pub fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> ContainuResult<T> {
        let state = self.read_state()?;
        Ok(f(&state))
    }

    /// Changes the selection. Ids that do not name a container are dropped.
    pub fn update_selection(&self, f: impl FnOnce(&mut Selection)) -> ContainuResult<Selection> {
        self.mutate(|state| {
            f(state.selection_mut());
            state.prune_selection();
            Ok(state.get_selection().clone())
        })
    }

    /// Appends a log entry to a container's buffer.
    pub fn append_log(&self, id: Uuid, entry: LogEntry) -> ContainuResult<()> {
        self.mutate(|state| state.append_log(id, entry))
    }

    /// Appends a metric sample to a container's series.
    pub fn append_metric(&self, id: Uuid, sample: MetricSample) -> ContainuResult<()> {
        self.mutate(|state| state.append_metric(id, sample))
    }

    /// Returns a copy of a container's log buffer, oldest first.
    pub fn logs(&self, id: Uuid) -> ContainuResult<Vec<LogEntry>> {
        self.read_state()?.logs(id)
    }

    /// Returns a copy of a container's metric series, oldest first.
    pub fn metrics(&self, id: Uuid) -> ContainuResult<Vec<MetricSample>> {
        self.read_state()?.metrics(id)
    }

    /// Lists all containers.
    pub fn containers(&self) -> ContainuResult<Vec<Container>> {
        self.read(|state| state.get_containers().clone())
    }

    /// Returns one container.
    pub fn container(&self, id: Uuid) -> ContainuResult<Container> {
        self.read_state()?.container(id).cloned()
    }

    /// Lists all images.
    pub fn images(&self) -> ContainuResult<Vec<ContainerImage>> {
        self.read(|state| state.get_images().clone())
    }

    /// Returns one image.
    pub fn image(&self, id: Uuid) -> ContainuResult<ContainerImage> {
        self.read(|state| state.get_images().iter().find(|i| i.id == id).cloned())?
            .ok_or(ContainuError::NotFound {
                kind: ResourceKind::Image,
                id,
            })
    }

    /// Lists all networks.
    pub fn networks(&self) -> ContainuResult<Vec<Network>> {
        self.read(|state| state.get_networks().clone())
    }

    /// Returns one network.
    pub fn network(&self, id: Uuid) -> ContainuResult<Network> {
        self.read(|state| state.get_networks().iter().find(|n| n.id == id).cloned())?
            .ok_or(ContainuError::NotFound {
                kind: ResourceKind::Network,
                id,
            })
    }

    /// Lists all volumes.
    pub fn volumes(&self) -> ContainuResult<Vec<Volume>> {
        self.read(|state| state.get_volumes().clone())
    }

    /// Returns one volume.
    pub fn volume(&self, id: Uuid) -> ContainuResult<Volume> {
        self.read(|state| state.get_volumes().iter().find(|v| v.id == id).cloned())?
            .ok_or(ContainuError::NotFound {
                kind: ResourceKind::Volume,
                id,
            })
    }

    fn read_state(&self) -> ContainuResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|e| ContainuError::LockPoisoned(e.to_string()))
    }

    fn write_state(&self) -> ContainuResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|e| ContainuError::LockPoisoned(e.to_string()))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
