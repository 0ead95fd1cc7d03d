//! Live connection bookkeeping.

pub mod authenticator;
pub mod handle;
pub mod registry;

pub use authenticator::WsAuthenticator;
pub use handle::{CloseReason, ConnectionHandle};
pub use registry::ConnectionRegistry;
