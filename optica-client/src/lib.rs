//! Optica Client - HTTP client for the retail backend
//!
//! Implements the checkout engine's gateway ports over the backend's
//! REST API.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::OpticaClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::envelope::{ApiEnvelope, Page};
