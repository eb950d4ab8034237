//! Order wire types
//!
//! Payloads exchanged with the retail backend when an order is
//! submitted, plus the confirmation and payment records it returns.

use crate::prescription::PrescriptionData;
use crate::types::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Payment
// ============================================================================

/// How the customer settles the amount due now.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Settled at the counter
    #[default]
    Cash,
    /// Redirected to the card/bank payment gateway
    Online,
}

/// Lifecycle of a payment record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Payment record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    /// Amount settled, in whole dong
    pub amount: Amount,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Redirect target returned by the payment gateway for online orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentUrl {
    pub url: String,
}

// ============================================================================
// Shipping
// ============================================================================

/// Where the finished glasses go.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingKind {
    /// Courier delivery to a free-form address, flat fee applies
    Delivery,
    /// Collection at a branch kiosk, free of charge
    KioskPickup,
}

// ============================================================================
// Order Submission
// ============================================================================

/// One configured product line: a frame plus two lenses cut to one
/// prescription. `quantity` counts complete sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub frame_id: String,
    pub left_lens_id: String,
    pub right_lens_id: String,
    /// Empty for plano lens types
    #[serde(default)]
    pub prescription: PrescriptionData,
    pub quantity: u32,
}

/// Create order payload.
///
/// Prices are deliberately absent: the backend re-resolves every line
/// against the catalog at submission time and is the authority on the
/// charged total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderPayload {
    pub customer_id: String,
    pub shipping_kind: ShippingKind,
    /// Required when `shipping_kind` is `DELIVERY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Required when `shipping_kind` is `KIOSK_PICKUP`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kiosk_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_id: Option<String>,
    /// Pay the 30% deposit now instead of the full amount
    pub is_deposit: bool,
    pub payment_method: PaymentMethod,
    pub lines: Vec<OrderLine>,
}

// ============================================================================
// Order Confirmation
// ============================================================================

/// Backend order state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, payment not yet confirmed
    Pending,
    /// Deposit or full amount received, lenses in production
    Confirmed,
    Completed,
    Cancelled,
}

/// What the backend returns once an order is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub status: OrderStatus,
    /// Number of product lines accepted
    pub item_count: u32,
    /// Grand total charged for the order, in whole dong
    pub total: Amount,
    /// Portion payable immediately (deposit or full amount plus shipping)
    pub amount_due: Amount,
    pub created_at: DateTime<Utc>,
}
