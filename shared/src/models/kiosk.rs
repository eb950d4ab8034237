//! Kiosk Model

use serde::{Deserialize, Serialize};

/// Pickup kiosk entity (a physical branch customers collect from)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kiosk {
    pub id: String,
    pub name: String,
    pub address: String,
    pub is_active: bool,
}
