//! API response envelope
//!
//! Every endpoint of the retail backend wraps its payload in the same
//! envelope:
//!
//! ```json
//! {
//!     "code": "OK",
//!     "message": "Success",
//!     "data": { ... }
//! }
//! ```
//!
//! List endpoints put a [`Page`] in `data`.

use serde::{Deserialize, Serialize};

/// Envelope code reported on success.
pub const API_CODE_OK: &str = "OK";

/// Unified response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Response code (`OK` = success, others = backend error codes)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Payload, absent on errors and on empty success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful envelope.
    pub fn ok(data: T) -> Self {
        Self {
            code: API_CODE_OK.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create an error envelope.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Whether the backend reported success.
    pub fn is_ok(&self) -> bool {
        self.code == API_CODE_OK
    }

    /// Unwrap the payload, discarding the envelope.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total matching items across all pages
    pub total_count: u64,
}

impl<T> Page<T> {
    /// Create a page from items plus the backend-reported total.
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    /// An empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}
