//! # flareboard-entity
//!
//! Domain models shared by the server and the client: the persisted
//! [`notification::Notification`] record, typed task/project update
//! payloads, and the realtime wire protocol.

pub mod board;
pub mod notification;
pub mod realtime;
