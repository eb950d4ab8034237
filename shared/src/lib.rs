//! Shared types for the Optica checkout stack
//!
//! Domain entities and wire contracts used by both the checkout engine
//! and the HTTP client: catalog items, vouchers, customer accounts,
//! pickup kiosks, prescriptions, order payloads and the response
//! envelope of the retail backend.

pub mod envelope;
pub mod models;
pub mod order;
pub mod prescription;
pub mod types;

pub use envelope::{ApiEnvelope, Page};
pub use types::{Amount, format_vnd};
