//! Data models
//!
//! Shared between the checkout engine and the HTTP client.
//! All IDs are opaque `String`s minted by the backend.

pub mod account;
pub mod frame;
pub mod kiosk;
pub mod lens;
pub mod voucher;

// Re-exports
pub use account::*;
pub use frame::*;
pub use kiosk::*;
pub use lens::*;
pub use voucher::*;
