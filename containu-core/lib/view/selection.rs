use std::collections::BTreeSet;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The current container and the set marked for batch actions.
///
/// The two are independent: a container can be current without being marked and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct Selection {
    /// The container whose details are shown
    #[getset(get_copy = "pub with_prefix")]
    current: Option<Uuid>,

    /// Containers marked for a batch action
    #[getset(get = "pub with_prefix")]
    marked: BTreeSet<Uuid>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Selection {
    /// Makes `id` the current container.
    pub fn select(&mut self, id: Uuid) {
        self.current = Some(id);
    }

    /// Clears the current container. Marks are untouched.
    pub fn deselect(&mut self) {
        self.current = None;
    }

    /// Adds `id` to the marked set.
    pub fn mark(&mut self, id: Uuid) {
        self.marked.insert(id);
    }

    /// Removes `id` from the marked set.
    pub fn unmark(&mut self, id: Uuid) {
        self.marked.remove(&id);
    }

    /// Flips whether `id` is marked and returns the new state.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.marked.remove(&id) {
            false
        } else {
            self.marked.insert(id);
            true
        }
    }

    /// Clears both the current container and the marked set.
    pub fn clear(&mut self) {
        self.current = None;
        self.marked.clear();
    }

    /// Drops every reference to `id`. Called when the container is deleted.
    pub fn forget(&mut self, id: Uuid) {
        if self.current == Some(id) {
            self.current = None;
        }
        self.marked.remove(&id);
    }

    /// Returns `true` if `id` is current or marked.
    pub fn references(&self, id: Uuid) -> bool {
        self.current == Some(id) || self.marked.contains(&id)
    }

    /// Returns the ids a batch action should target.
    ///
    /// The marked set wins when non-empty. Otherwise the current container is the sole target,
    /// and with neither there is nothing to do.
    pub fn resolve_targets(&self) -> Vec<Uuid> {
        if !self.marked.is_empty() {
            return self.marked.iter().copied().collect();
        }

        self.current.into_iter().collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
