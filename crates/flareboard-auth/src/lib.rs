//! # flareboard-auth
//!
//! The Token Verifier seam ([`TokenVerifier`]) and its HS256 JWT
//! implementation. The same verifier gates HTTP requests and realtime
//! handshakes.

pub mod jwt;
pub mod verifier;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use verifier::TokenVerifier;
