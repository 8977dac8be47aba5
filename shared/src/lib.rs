//! Shared types for the admin console
//!
//! Common types used by the server and by future clients: data models,
//! request DTOs, and the unified response envelope.

pub mod models;
pub mod request;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use request::PageQuery;
pub use response::{ApiResponse, Paginated};
