//! # flareboard-client
//!
//! Client side of the FlareBoard live channel. A [`RealtimeSession`] owns
//! one connection per signed-in tab, keeps the local notification list
//! and unread counter, reconciles against the CRUD surface whenever it
//! (re)connects and re-publishes task/project updates on a local event
//! bus.

pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod session;
pub mod store;
pub mod transport;

pub use api::{HttpNotificationApi, NotificationApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use event::{ConnectionState, LocalEvent};
pub use session::{Credentials, RealtimeSession};
pub use store::NotificationList;
pub use transport::{RealtimeTransport, TransportConnection, WsTransport};
