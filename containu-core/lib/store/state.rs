use std::collections::{HashMap, VecDeque};

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{Container, ContainerImage, LogEntry, MetricSample, Network, ResourceKind, Volume},
    view::Selection,
    ContainuError, ContainuResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The mutable state behind a [`ResourceStore`](super::ResourceStore).
///
/// Every mutator checks its preconditions before touching anything, so a mutator that returns an
/// error leaves the state exactly as it found it.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct StoreState {
    /// Containers, in insertion order
    containers: Vec<Container>,

    /// Images, in insertion order
    images: Vec<ContainerImage>,

    /// Networks, in insertion order
    networks: Vec<Network>,

    /// Volumes, in insertion order
    volumes: Vec<Volume>,

    /// Current and marked containers
    selection: Selection,

    #[getset(skip)]
    logs: HashMap<Uuid, VecDeque<LogEntry>>,

    #[getset(skip)]
    metrics: HashMap<Uuid, VecDeque<MetricSample>>,

    #[getset(skip)]
    log_capacity: usize,

    #[getset(skip)]
    metric_capacity: usize,

    #[getset(skip)]
    revision: u64,
}

/// A consistent, point-in-time copy of the store's collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct StoreSnapshot {
    /// Incremented by every successful mutation
    #[getset(get_copy = "pub with_prefix")]
    revision: u64,

    /// Containers, in insertion order
    #[getset(get = "pub with_prefix")]
    containers: Vec<Container>,

    /// Images, in insertion order
    #[getset(get = "pub with_prefix")]
    images: Vec<ContainerImage>,

    /// Networks, in insertion order
    #[getset(get = "pub with_prefix")]
    networks: Vec<Network>,

    /// Volumes, in insertion order
    #[getset(get = "pub with_prefix")]
    volumes: Vec<Volume>,

    /// Current and marked containers
    #[getset(get = "pub with_prefix")]
    selection: Selection,
}

//--------------------------------------------------------------------------------------------------
// Methods: StoreState
//--------------------------------------------------------------------------------------------------

impl StoreState {
    /// Creates an empty state with the given per-container buffer bounds.
    pub fn new(log_capacity: usize, metric_capacity: usize) -> Self {
        Self {
            containers: Vec::new(),
            images: Vec::new(),
            networks: Vec::new(),
            volumes: Vec::new(),
            selection: Selection::default(),
            logs: HashMap::new(),
            metrics: HashMap::new(),
            log_capacity,
            metric_capacity,
            revision: 0,
        }
    }

    /// Returns a snapshot of the collections and selection.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            revision: self.revision,
            containers: self.containers.clone(),
            images: self.images.clone(),
            networks: self.networks.clone(),
            volumes: self.volumes.clone(),
            selection: self.selection.clone(),
        }
    }

    pub(super) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    //----------------------------------------------------------------------------------------------
    // Containers
    //----------------------------------------------------------------------------------------------

    /// Returns the container with the given id.
    pub fn container(&self, id: Uuid) -> ContainuResult<&Container> {
        self.containers
            .iter()
            .find(|c| c.id == id)
            .ok_or(ContainuError::container_not_found(id))
    }

    /// Returns the container with the given id for modification.
    pub fn container_mut(&mut self, id: Uuid) -> ContainuResult<&mut Container> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ContainuError::container_not_found(id))
    }

    /// Inserts a container and records it on every existing network and volume it names.
    pub fn insert_container(&mut self, container: Container) -> ContainuResult<()> {
        if self.containers.iter().any(|c| c.name == container.name) {
            return Err(ContainuError::DuplicateName(container.name));
        }

        for network in self
            .networks
            .iter_mut()
            .filter(|n| container.networks.contains(&n.name))
        {
            network.containers.push(container.id);
        }

        for volume in self
            .volumes
            .iter_mut()
            .filter(|v| container.volumes.contains(&v.name))
        {
            volume.containers.push(container.id);
        }

        self.containers.push(container);
        Ok(())
    }

    /// Removes a container together with its buffers, selection entries and back-references.
    pub fn remove_container(&mut self, id: Uuid) -> ContainuResult<Container> {
        let index = self
            .containers
            .iter()
            .position(|c| c.id == id)
            .ok_or(ContainuError::container_not_found(id))?;

        let container = self.containers.remove(index);
        self.logs.remove(&id);
        self.metrics.remove(&id);
        self.selection.forget(id);

        for network in self.networks.iter_mut() {
            network.containers.retain(|c| *c != id);
        }

        for volume in self.volumes.iter_mut() {
            volume.containers.retain(|c| *c != id);
        }

        Ok(container)
    }

    /// Returns the selection for modification.
    ///
    /// Ids that do not name a container are dropped by the store after the change.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub(super) fn prune_selection(&mut self) {
        let stale: Vec<Uuid> = self
            .selection
            .get_marked()
            .iter()
            .copied()
            .chain(self.selection.get_current())
            .filter(|id| !self.containers.iter().any(|c| c.id == *id))
            .collect();

        for id in stale {
            self.selection.forget(id);
        }
    }

    //----------------------------------------------------------------------------------------------
    // Images, networks, volumes
    //----------------------------------------------------------------------------------------------

    /// Appends an image. Repeated `repository:tag` pairs are allowed.
    pub fn insert_image(&mut self, image: ContainerImage) {
        self.images.push(image);
    }

    /// Removes an image, returning `None` if it was not present.
    pub fn remove_image(&mut self, id: Uuid) -> Option<ContainerImage> {
        let index = self.images.iter().position(|i| i.id == id)?;
        Some(self.images.remove(index))
    }

    /// Appends a network.
    pub fn insert_network(&mut self, network: Network) {
        self.networks.push(network);
    }

    /// Removes a network, returning `None` if it was not present.
    ///
    /// ## Errors
    /// Fails with [`ContainuError::BuiltinNetwork`] for `bridge`, `host` and `none`.
    pub fn remove_network(&mut self, id: Uuid) -> ContainuResult<Option<Network>> {
        let Some(index) = self.networks.iter().position(|n| n.id == id) else {
            return Ok(None);
        };

        if self.networks[index].is_builtin() {
            return Err(ContainuError::BuiltinNetwork(
                self.networks[index].name.clone(),
            ));
        }

        Ok(Some(self.networks.remove(index)))
    }

    /// Appends a volume.
    pub fn insert_volume(&mut self, volume: Volume) {
        self.volumes.push(volume);
    }

    /// Removes a volume, returning `None` if it was not present.
    pub fn remove_volume(&mut self, id: Uuid) -> Option<Volume> {
        let index = self.volumes.iter().position(|v| v.id == id)?;
        Some(self.volumes.remove(index))
    }

    //----------------------------------------------------------------------------------------------
    // Logs and metrics
    //----------------------------------------------------------------------------------------------

    /// Appends a log entry to a container's buffer, evicting the oldest entries past capacity.
    ///
    /// The entry's timestamp is raised to the last entry's if it is earlier, so every buffer
    /// stays ordered by timestamp.
    pub fn append_log(&mut self, id: Uuid, mut entry: LogEntry) -> ContainuResult<()> {
        self.container(id)?;

        let buffer = self.logs.entry(id).or_default();
        if let Some(last) = buffer.back() {
            if entry.timestamp < last.timestamp {
                entry.timestamp = last.timestamp;
            }
        }

        buffer.push_back(entry);
        while buffer.len() > self.log_capacity {
            buffer.pop_front();
        }

        Ok(())
    }

    /// Appends a metric sample to a container's series, evicting the oldest samples past
    /// capacity.
    pub fn append_metric(&mut self, id: Uuid, sample: MetricSample) -> ContainuResult<()> {
        self.container(id)?;

        let buffer = self.metrics.entry(id).or_default();
        buffer.push_back(sample);
        while buffer.len() > self.metric_capacity {
            buffer.pop_front();
        }

        Ok(())
    }

    /// Returns a copy of a container's log buffer, oldest first.
    pub fn logs(&self, id: Uuid) -> ContainuResult<Vec<LogEntry>> {
        self.container(id)?;
        Ok(self
            .logs
            .get(&id)
            .map(|buffer| buffer.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Returns a copy of a container's metric series, oldest first.
    pub fn metrics(&self, id: Uuid) -> ContainuResult<Vec<MetricSample>> {
        self.container(id)?;
        Ok(self
            .metrics
            .get(&id)
            .map(|buffer| buffer.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Returns `true` if the container has a buffer with at least one log entry.
    pub fn has_logs(&self, id: Uuid) -> bool {
        self.logs.get(&id).is_some_and(|buffer| !buffer.is_empty())
    }
}

//--------------------------------------------------------------------------------------------------
// Methods: StoreSnapshot
//--------------------------------------------------------------------------------------------------

impl StoreSnapshot {
    /// Returns the container with the given id.
    pub fn container(&self, id: Uuid) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    /// Returns the container with the given name.
    pub fn container_by_name(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// Returns the image with the given id.
    pub fn image(&self, id: Uuid) -> Option<&ContainerImage> {
        self.images.iter().find(|i| i.id == id)
    }

    /// Returns the first image with the given `repository:tag` reference.
    pub fn image_by_reference(&self, reference: &str) -> Option<&ContainerImage> {
        self.images.iter().find(|i| i.reference() == reference)
    }

    /// Returns the network with the given id.
    pub fn network(&self, id: Uuid) -> Option<&Network> {
        self.networks.iter().find(|n| n.id == id)
    }

    /// Returns the first network with the given name.
    pub fn network_by_name(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name == name)
    }

    /// Returns the volume with the given id.
    pub fn volume(&self, id: Uuid) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.id == id)
    }

    /// Returns the first volume with the given name.
    pub fn volume_by_name(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    /// Returns the display name for an id of the given kind, falling back to the id itself.
    pub fn describe(&self, kind: ResourceKind, id: Uuid) -> String {
        let name = match kind {
            ResourceKind::Container => self.container(id).map(|c| c.name.clone()),
            ResourceKind::Image => self.image(id).map(|i| i.reference()),
            ResourceKind::Network => self.network(id).map(|n| n.name.clone()),
            ResourceKind::Volume => self.volume(id).map(|v| v.name.clone()),
        };

        name.unwrap_or_else(|| id.to_string())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::LogLevel;

    fn state_with(names: &[&str]) -> (StoreState, Vec<Uuid>) {
        let mut state = StoreState::new(3, 2);
        let ids = names
            .iter()
            .map(|name| {
                let container = Container::builder().name(*name).image("nginx:latest").build();
                let id = container.id;
                state.insert_container(container).unwrap();
                id
            })
            .collect();

        (state, ids)
    }

    #[test]
    fn test_insert_container_rejects_duplicate_name() {
        let (mut state, _) = state_with(&["web"]);
        let duplicate = Container::builder().name("web").image("httpd").build();

        let result = state.insert_container(duplicate);
        assert!(matches!(result, Err(ContainuError::DuplicateName(name)) if name == "web"));
        assert_eq!(state.get_containers().len(), 1);
    }

    #[test]
    fn test_insert_and_remove_container_maintains_back_references() {
        let mut state = StoreState::new(10, 10);
        state.insert_network(Network::builder().name("app-net").driver("bridge").build());
        state.insert_volume(
            Volume::builder()
                .name("data")
                .driver("local")
                .mount_point("/data")
                .build(),
        );

        let container = Container::builder()
            .name("web")
            .image("nginx")
            .networks(vec!["app-net".to_string(), "missing-net".to_string()])
            .volumes(vec!["data".to_string()])
            .build();
        let id = container.id;
        state.insert_container(container).unwrap();

        assert_eq!(state.get_networks()[0].containers, vec![id]);
        assert_eq!(state.get_volumes()[0].containers, vec![id]);

        state.remove_container(id).unwrap();

        assert!(state.get_networks()[0].containers.is_empty());
        assert!(state.get_volumes()[0].containers.is_empty());
    }

    #[test]
    fn test_remove_container_clears_buffers_and_selection() {
        let (mut state, ids) = state_with(&["a", "b"]);
        state.append_log(ids[0], LogEntry::info("hello")).unwrap();
        state
            .append_metric(ids[0], MetricSample::random(Utc::now()))
            .unwrap();
        state.selection_mut().select(ids[0]);
        state.selection_mut().mark(ids[0]);
        state.selection_mut().mark(ids[1]);

        state.remove_container(ids[0]).unwrap();

        assert!(!state.get_selection().references(ids[0]));
        assert!(state.get_selection().references(ids[1]));
        assert!(!state.has_logs(ids[0]));
        assert!(state.logs(ids[0]).unwrap_err().is_not_found());
        assert!(state.remove_container(ids[0]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_append_log_evicts_oldest_and_keeps_order() {
        let (mut state, ids) = state_with(&["a"]);
        let now = Utc::now();

        for i in 0..5 {
            state
                .append_log(ids[0], LogEntry::at(now, format!("line {}", i), LogLevel::Info))
                .unwrap();
        }

        let early = LogEntry::at(now - Duration::seconds(30), "late arrival", LogLevel::Warning);
        state.append_log(ids[0], early).unwrap();

        let logs = state.logs(ids[0]).unwrap();
        let messages: Vec<_> = logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["line 3", "line 4", "late arrival"]);
        assert!(logs.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_append_metric_bounded_fifo() {
        let (mut state, ids) = state_with(&["a"]);
        let start = Utc::now();
        let samples: Vec<_> = (0..4)
            .map(|i| MetricSample::random(start + Duration::seconds(i)))
            .collect();

        for sample in samples.iter().cloned() {
            state.append_metric(ids[0], sample).unwrap();
        }

        assert_eq!(state.metrics(ids[0]).unwrap(), samples[2..].to_vec());
    }

    #[test]
    fn test_append_to_missing_container_fails() {
        let (mut state, _) = state_with(&[]);
        let result = state.append_log(Uuid::new_v4(), LogEntry::info("x"));
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_builtin_network_fails() {
        let mut state = StoreState::new(1, 1);
        let bridge = Network::builder().name("bridge").driver("bridge").build();
        let id = bridge.id;
        state.insert_network(bridge);

        let result = state.remove_network(id);
        assert!(matches!(result, Err(ContainuError::BuiltinNetwork(_))));
        assert_eq!(state.get_networks().len(), 1);
        assert!(state.remove_network(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_prune_selection_drops_unknown_ids() {
        let (mut state, ids) = state_with(&["a"]);
        let ghost = Uuid::new_v4();
        state.selection_mut().select(ghost);
        state.selection_mut().mark(ghost);
        state.selection_mut().mark(ids[0]);

        state.prune_selection();

        assert_eq!(state.get_selection().get_current(), None);
        assert_eq!(state.get_selection().resolve_targets(), vec![ids[0]]);
    }

    #[test]
    fn test_snapshot_describe() {
        let (state, ids) = state_with(&["web"]);
        let snapshot = state.snapshot();

        assert_eq!(snapshot.describe(ResourceKind::Container, ids[0]), "web");
        let ghost = Uuid::new_v4();
        assert_eq!(
            snapshot.describe(ResourceKind::Container, ghost),
            ghost.to_string()
        );
    }
}
