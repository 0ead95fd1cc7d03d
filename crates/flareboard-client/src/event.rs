//! Connection state and the local event bus payloads.

use flareboard_entity::board::{ProjectUpdate, TaskUpdate};
use flareboard_entity::notification::Notification;

/// Where the session is in its connect cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport. The last known list is kept.
    Disconnected,
    /// Opening the socket and waiting for `connected`.
    Connecting,
    /// Handshake accepted.
    Connected,
}

/// Same-process events for whichever components care.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEvent {
    /// A task changed somewhere on the board.
    TaskUpdated(TaskUpdate),
    /// A project changed somewhere on the board.
    ProjectUpdated(ProjectUpdate),
    /// A pushed notification was added to the local list.
    NotificationReceived(Notification),
    /// A CRUD call backing a local change failed. The local state was
    /// kept and the next reconciliation will repair it.
    SyncFailed {
        /// Which operation failed.
        operation: String,
        /// Why.
        message: String,
    },
}
