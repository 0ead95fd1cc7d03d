//! Connection registry: user ID to the set of that user's live sessions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use flareboard_core::types::id::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// Thread-safe map of online users to their open sessions.
///
/// A user key exists if and only if that user has at least one session:
/// removing the last session removes the key under the same shard lock,
/// so readers never observe an empty entry. The per-user map doubles as
/// the user's delivery group, which keeps "registered" and "reachable"
/// the same fact.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<UserId, HashMap<ConnectionId, Arc<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session to its user's set. Returns `false` if it was already
    /// present.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> bool {
        let mut group = self.sessions.entry(handle.user_id).or_default();
        match group.entry(handle.id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    /// Adds a session, first removing the user's oldest sessions until fewer
    /// than `cap` remain. `cap == 0` means unlimited. The check and the
    /// insert happen under one shard lock. Returns the removed sessions;
    /// the caller closes them.
    pub fn register_capped(
        &self,
        handle: Arc<ConnectionHandle>,
        cap: usize,
    ) -> Vec<Arc<ConnectionHandle>> {
        let mut group = self.sessions.entry(handle.user_id).or_default();
        let mut evicted = Vec::new();
        if cap > 0 {
            while group.len() >= cap {
                let Some(oldest) = group
                    .values()
                    .min_by_key(|h| h.connected_at)
                    .map(|h| h.id)
                else {
                    break;
                };
                if let Some(removed) = group.remove(&oldest) {
                    evicted.push(removed);
                }
            }
        }
        group.insert(handle.id, handle);
        evicted
    }

    /// Removes a session. Absent users or sessions are ignored.
    pub fn unregister(
        &self,
        user_id: UserId,
        conn_id: ConnectionId,
    ) -> Option<Arc<ConnectionHandle>> {
        match self.sessions.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let removed = entry.get_mut().remove(&conn_id);
                if entry.get().is_empty() {
                    entry.remove();
                }
                removed
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Snapshot of a user's session IDs; empty if offline.
    pub fn sessions_for(&self, user_id: UserId) -> HashSet<ConnectionId> {
        self.sessions
            .get(&user_id)
            .map(|group| group.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of a user's session handles; empty if offline.
    pub fn handles_for(&self, user_id: UserId) -> Vec<Arc<ConnectionHandle>> {
        self.sessions
            .get(&user_id)
            .map(|group| group.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every registered handle.
    pub fn all_handles(&self) -> Vec<Arc<ConnectionHandle>> {
        self.sessions
            .iter()
            .flat_map(|group| group.values().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Whether the user has at least one session.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Number of distinct online users.
    pub fn connected_user_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of open sessions across all users.
    pub fn connection_count(&self) -> usize {
        self.sessions.iter().map(|group| group.len()).sum()
    }
}
