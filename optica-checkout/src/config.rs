//! Checkout engine configuration

use crate::money::RemainderRule;
use rust_decimal::Decimal;
use shared::Amount;

/// Default flat courier fee (dong)
const DEFAULT_DELIVERY_FEE: Amount = 30_000;
/// Default deposit rate (30%)
const DEFAULT_DEPOSIT_PERCENT: i64 = 30;

/// Tunables of the checkout engine. One instance per flow; tests
/// override single knobs with the `with_*` builders.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Flat fee charged on courier delivery, in whole dong
    pub delivery_fee: Amount,
    /// Fraction of the discounted total due as deposit (0 to 1)
    pub deposit_rate: Decimal,
    /// Formula for the balance left after the deposit
    pub remainder_rule: RemainderRule,
}

impl CheckoutConfig {
    pub fn from_env() -> Self {
        Self {
            delivery_fee: std::env::var("OPTICA_DELIVERY_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DELIVERY_FEE),
            deposit_rate: std::env::var("OPTICA_DEPOSIT_PERCENT")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|p| (0..=100).contains(p))
                .map(|p| Decimal::new(p, 2))
                .unwrap_or_else(|| Decimal::new(DEFAULT_DEPOSIT_PERCENT, 2)),
            remainder_rule: std::env::var("OPTICA_REMAINDER_RULE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    pub fn with_delivery_fee(mut self, fee: Amount) -> Self {
        self.delivery_fee = fee;
        self
    }

    pub fn with_deposit_rate(mut self, rate: Decimal) -> Self {
        self.deposit_rate = rate;
        self
    }

    pub fn with_remainder_rule(mut self, rule: RemainderRule) -> Self {
        self.remainder_rule = rule;
        self
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            delivery_fee: DEFAULT_DELIVERY_FEE,
            deposit_rate: Decimal::new(DEFAULT_DEPOSIT_PERCENT, 2),
            remainder_rule: RemainderRule::default(),
        }
    }
}
