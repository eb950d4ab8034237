//! Order draft
//!
//! Immutable value holding everything the staff has decided besides
//! the cart contents. Every change consumes the draft and returns a
//! new one with a bumped revision, so views comparing revisions can
//! tell eagerly whether anything moved.

use crate::shipping::ShippingMethod;
use shared::models::{Account, Voucher};
use shared::order::PaymentMethod;
use thiserror::Error;

/// Draft transition failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DraftError {
    /// One voucher per order; the old one must be removed first
    #[error("a voucher is already applied, remove it before applying another")]
    VoucherAlreadyApplied,
}

/// Everything chosen for the order besides the cart lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    customer: Option<Account>,
    shipping: Option<ShippingMethod>,
    voucher: Option<Voucher>,
    is_deposit: bool,
    payment_method: Option<PaymentMethod>,
    revision: u32,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Transitions ==========

    pub fn with_customer(mut self, customer: Account) -> Self {
        self.customer = Some(customer);
        self.bump()
    }

    pub fn with_shipping(mut self, shipping: ShippingMethod) -> Self {
        self.shipping = Some(shipping);
        self.bump()
    }

    /// Attach a voucher. Replacing an applied voucher without an
    /// explicit removal is a bug in the caller, not a user action.
    pub fn with_voucher(mut self, voucher: Voucher) -> Result<Self, DraftError> {
        if self.voucher.is_some() {
            return Err(DraftError::VoucherAlreadyApplied);
        }
        self.voucher = Some(voucher);
        Ok(self.bump())
    }

    pub fn without_voucher(mut self) -> Self {
        self.voucher = None;
        self.bump()
    }

    pub fn with_deposit(mut self, is_deposit: bool) -> Self {
        self.is_deposit = is_deposit;
        self.bump()
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self.bump()
    }

    fn bump(mut self) -> Self {
        self.revision += 1;
        self
    }

    // ========== Accessors ==========

    pub fn customer(&self) -> Option<&Account> {
        self.customer.as_ref()
    }

    pub fn shipping(&self) -> Option<&ShippingMethod> {
        self.shipping.as_ref()
    }

    pub fn voucher(&self) -> Option<&Voucher> {
        self.voucher.as_ref()
    }

    pub fn is_deposit(&self) -> bool {
        self.is_deposit
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }
}
