//! Realtime frame encoding and validation.

pub mod codec;
pub mod validator;

pub use codec::{decode_client, encode_server};
pub use validator::validate_inbound;
