//! Last known state of every window and workspace
//!
//! Only the dispatcher touches the cache, one notification at a time, so no
//! locking is involved.

use std::collections::{HashMap, HashSet};

use super::entity::Entity;
use crate::niri_ipc::{Window, Workspace};

/// Entities of one kind, keyed by id
#[derive(Debug, Clone)]
pub struct EntityStore<E> {
    entries: HashMap<u64, E>,
}

impl<E> Default for EntityStore<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn get(&self, id: u64) -> Option<&E> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Outcome of the last evaluation, `false` for unknown ids
    pub fn was_matched(&self, id: u64) -> bool {
        self.get(id).is_some_and(|entity| entity.is_matched())
    }

    /// Store an entity, replacing any previous state for its id
    pub fn insert(&mut self, entity: E) {
        self.entries.insert(entity.id(), entity);
    }

    pub fn remove(&mut self, id: u64) -> Option<E> {
        self.entries.remove(&id)
    }

    /// Drop every entity whose id is not in `keep`, returning the dropped ids
    pub fn retain_ids(&mut self, keep: &HashSet<u64>) -> Vec<u64> {
        let evicted: Vec<u64> = self
            .entries
            .keys()
            .filter(|id| !keep.contains(id))
            .copied()
            .collect();
        for id in &evicted {
            self.entries.remove(id);
        }
        evicted
    }

    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Windows and workspaces as of the last notification
#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    pub windows: EntityStore<Window>,
    pub workspaces: EntityStore<Workspace>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niri_ipc::fixtures::{niri_window, niri_workspace};

    #[test]
    fn test_unknown_id_was_not_matched() {
        let cache = EntityCache::new();
        assert!(!cache.windows.was_matched(1));
        assert!(cache.windows.is_empty());
    }

    #[test]
    fn test_insert_replaces_previous_state() {
        let mut cache = EntityCache::new();
        let mut window: Window = niri_window(1, Some("kitty"), None).into();
        window.matched = true;
        cache.windows.insert(window);

        let mut updated: Window = niri_window(1, Some("kitty"), Some("vim")).into();
        updated.matched = false;
        cache.windows.insert(updated);

        assert_eq!(cache.windows.len(), 1);
        assert!(!cache.windows.was_matched(1));
        assert_eq!(cache.windows.get(1).unwrap().title, "vim");
    }

    #[test]
    fn test_remove_window() {
        let mut cache = EntityCache::new();
        cache.windows.insert(niri_window(4, None, None).into());

        assert!(cache.windows.remove(4).is_some());
        assert!(!cache.windows.contains(4));
        assert!(cache.windows.remove(4).is_none());
    }

    #[test]
    fn test_retain_ids_evicts_missing_workspaces() {
        let mut cache = EntityCache::new();
        for id in [1, 2, 3] {
            cache.workspaces.insert(niri_workspace(id, id as u8, None).into());
        }

        let keep: HashSet<u64> = [2].into_iter().collect();
        let mut evicted = cache.workspaces.retain_ids(&keep);
        evicted.sort_unstable();

        assert_eq!(evicted, vec![1, 3]);
        assert_eq!(cache.workspaces.ids().collect::<Vec<_>>(), vec![2]);
    }
}
