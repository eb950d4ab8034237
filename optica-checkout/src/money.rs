//! Price calculation utilities using rust_decimal for precision
//!
//! All amounts are whole dong ([`Amount`]). Percentages and the
//! deposit rate are applied in `Decimal` space and rounded half-up
//! back to a whole amount, matching how the backend settles orders.
//! Client figures are previews; the backend remains the authority on
//! the charged total.

use crate::config::CheckoutConfig;
use crate::error::ValidationError;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use shared::Amount;
use shared::order::ShippingKind;

/// Maximum sane merchandise subtotal (one billion dong)
const MAX_SUBTOTAL: Amount = 1_000_000_000;

/// Convert an amount to Decimal for calculation
#[inline]
pub fn to_decimal(amount: Amount) -> Decimal {
    Decimal::from(amount)
}

/// Convert a Decimal back to a whole amount, rounded half-up
#[inline]
pub fn to_amount(value: Decimal) -> Amount {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

/// Validate a merchandise subtotal before quoting or submitting
pub fn validate_subtotal(subtotal: Amount) -> Result<(), ValidationError> {
    if subtotal < 0 {
        return Err(ValidationError::new(
            "subtotal",
            format!("subtotal must be non-negative, got {subtotal}"),
        ));
    }
    if subtotal > MAX_SUBTOTAL {
        return Err(ValidationError::new(
            "subtotal",
            format!("subtotal exceeds maximum allowed ({MAX_SUBTOTAL}), got {subtotal}"),
        ));
    }
    Ok(())
}

// ============================================================================
// Remainder Rule
// ============================================================================

/// How the balance left after a deposit is derived.
///
/// The two formulas disagree by at most one dong when the deposit
/// rounding went the other way, so the choice is a config knob rather
/// than a hardcoded formula.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemainderRule {
    /// `remaining = round(after_discount * (1 - rate))`, the formula
    /// the billing department signs off on
    #[default]
    ScaledFromTotal,
    /// `remaining = after_discount - deposit`, exact by construction
    BalanceOfDeposit,
}

impl std::str::FromStr for RemainderRule {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SCALED_FROM_TOTAL" => Ok(Self::ScaledFromTotal),
            "BALANCE_OF_DEPOSIT" => Ok(Self::BalanceOfDeposit),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// Voucher discount on a subtotal.
///
/// `min(round(subtotal * percent / 100), subtotal)`, never negative.
/// Percentages above 100 are treated as 100.
pub fn discount_amount(subtotal: Amount, percent: u8) -> Amount {
    if subtotal <= 0 || percent == 0 {
        return 0;
    }
    let capped = percent.min(100);
    let raw = to_decimal(subtotal) * Decimal::from(capped) / Decimal::ONE_HUNDRED;
    to_amount(raw).min(subtotal)
}

/// Deposit due now when the customer pays a fraction up front.
pub fn deposit_amount(after_discount: Amount, rate: Decimal) -> Amount {
    if after_discount <= 0 {
        return 0;
    }
    to_amount(to_decimal(after_discount) * rate).clamp(0, after_discount)
}

/// Balance left for collection on delivery, per the configured rule.
pub fn remaining_amount(
    after_discount: Amount,
    deposit: Amount,
    rate: Decimal,
    rule: RemainderRule,
) -> Amount {
    if after_discount <= 0 {
        return 0;
    }
    match rule {
        RemainderRule::ScaledFromTotal => {
            to_amount(to_decimal(after_discount) * (Decimal::ONE - rate)).max(0)
        }
        RemainderRule::BalanceOfDeposit => (after_discount - deposit).max(0),
    }
}

/// Flat shipping fee for the chosen fulfilment, zero until chosen.
pub fn shipping_fee(shipping: Option<ShippingKind>, delivery_fee: Amount) -> Amount {
    match shipping {
        Some(ShippingKind::Delivery) => delivery_fee,
        Some(ShippingKind::KioskPickup) | None => 0,
    }
}

// ============================================================================
// Quote
// ============================================================================

/// Full price breakdown shown on the summary step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceQuote {
    /// Merchandise subtotal before any discount
    pub subtotal: Amount,
    /// Voucher discount
    pub discount: Amount,
    /// Subtotal after discount
    pub after_discount: Amount,
    /// Flat delivery fee, zero for kiosk pickup
    pub shipping_fee: Amount,
    /// Due now: the deposit, or the whole discounted amount
    pub deposit_amount: Amount,
    /// Due at handover, zero when paying in full
    pub remaining_amount: Amount,
    /// Charged in this transaction: deposit + shipping
    pub payable_now: Amount,
}

/// Compute the summary quote for a cart subtotal.
pub fn quote(
    subtotal: Amount,
    voucher_percent: Option<u8>,
    shipping: Option<ShippingKind>,
    is_deposit: bool,
    config: &CheckoutConfig,
) -> PriceQuote {
    let subtotal = subtotal.max(0);
    let discount = voucher_percent
        .map(|p| discount_amount(subtotal, p))
        .unwrap_or(0);
    let after_discount = (subtotal - discount).max(0);
    let shipping_fee = shipping_fee(shipping, config.delivery_fee);

    let (deposit, remaining) = if is_deposit {
        let deposit = deposit_amount(after_discount, config.deposit_rate);
        let remaining = remaining_amount(
            after_discount,
            deposit,
            config.deposit_rate,
            config.remainder_rule,
        );
        (deposit, remaining)
    } else {
        (after_discount, 0)
    };

    PriceQuote {
        subtotal,
        discount,
        after_discount,
        shipping_fee,
        deposit_amount: deposit,
        remaining_amount: remaining,
        payable_now: deposit + shipping_fee,
    }
}
