//! Local notification list with its derived unread counter.

use std::sync::{Mutex, MutexGuard};

use flareboard_core::types::id::NotificationId;
use flareboard_entity::notification::Notification;

#[derive(Debug, Default)]
struct ListState {
    items: Vec<Notification>,
    unread: usize,
}

/// Newest-first notifications plus the number of unread ones.
///
/// Every mutation updates the list and the counter under one lock, so a
/// reader never sees one without the other.
#[derive(Debug, Default)]
pub struct NotificationList {
    state: Mutex<ListState>,
}

impl NotificationList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current list, newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().items.clone()
    }

    /// Current unread counter.
    pub fn unread_count(&self) -> usize {
        self.lock().unread
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Overwrite with authoritative rows (already newest first).
    pub fn replace(&self, rows: Vec<Notification>) {
        let mut state = self.lock();
        state.unread = rows.iter().filter(|n| !n.is_read).count();
        state.items = rows;
    }

    /// Add a pushed notification at the front. A row already present (for
    /// example one returned by the reconciliation fetch) is ignored.
    pub fn prepend(&self, notification: Notification) -> bool {
        let mut state = self.lock();
        if state.items.iter().any(|n| n.id == notification.id) {
            return false;
        }
        if !notification.is_read {
            state.unread += 1;
        }
        state.items.insert(0, notification);
        true
    }

    /// Mark one entry read. Returns whether it changed.
    pub fn mark_read(&self, id: NotificationId) -> bool {
        let mut state = self.lock();
        let Some(entry) = state.items.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if entry.is_read {
            return false;
        }
        entry.is_read = true;
        state.unread -= 1;
        true
    }

    /// Mark every entry read. Returns how many changed.
    pub fn mark_all_read(&self) -> usize {
        let mut state = self.lock();
        let changed = state.unread;
        for entry in state.items.iter_mut() {
            entry.is_read = true;
        }
        state.unread = 0;
        changed
    }

    /// Remove one entry. Returns whether it existed.
    pub fn remove(&self, id: NotificationId) -> bool {
        let mut state = self.lock();
        let Some(pos) = state.items.iter().position(|n| n.id == id) else {
            return false;
        };
        let removed = state.items.remove(pos);
        if !removed.is_read {
            state.unread -= 1;
        }
        true
    }

    /// Drop every read entry. Returns how many were removed.
    pub fn clear_read(&self) -> usize {
        let mut state = self.lock();
        let before = state.items.len();
        state.items.retain(|n| !n.is_read);
        before - state.items.len()
    }
}
