//! Voucher Model

use serde::{Deserialize, Serialize};

/// Discount voucher entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voucher {
    pub id: String,
    pub name: String,
    /// Redemption code as printed on the coupon
    pub code: String,
    /// Percentage discount on the merchandise subtotal (1-100)
    pub percent: u8,
    /// Remaining redemptions; 0 means exhausted
    pub quantity: u32,
    pub is_active: bool,
}

impl Voucher {
    /// Whether the voucher can still be redeemed.
    pub fn is_redeemable(&self) -> bool {
        self.is_active && self.quantity > 0
    }
}
