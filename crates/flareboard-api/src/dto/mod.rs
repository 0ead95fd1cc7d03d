//! Request and response bodies.

pub mod request;
pub mod response;

pub use request::{CreateNotificationRequest, ListQuery, WsQuery};
pub use response::{
    AffectedResponse, ApiResponse, CountResponse, DeletedResponse, DetailedHealthResponse,
    HealthResponse, RealtimeStatusResponse,
};
