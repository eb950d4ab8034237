//! Shipping resolution
//!
//! Two mutually exclusive fulfilments: courier delivery to a composed
//! address (flat fee) or free pickup at a branch kiosk. Choosing one
//! clears whatever was typed for the other so a half-filled address
//! can never ride along with a kiosk order.

use crate::error::{ValidationError, first_violation};
use shared::models::Kiosk;
use shared::order::ShippingKind;
use validator::Validate;

/// Resolved fulfilment, ready to put on the order payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShippingMethod {
    /// Courier delivery to a display address
    ToAddress(String),
    /// Pickup at an active kiosk
    ToKiosk { kiosk_id: String },
}

impl ShippingMethod {
    pub fn kind(&self) -> ShippingKind {
        match self {
            Self::ToAddress(_) => ShippingKind::Delivery,
            Self::ToKiosk { .. } => ShippingKind::KioskPickup,
        }
    }
}

/// Delivery address as typed at the counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct AddressForm {
    #[validate(length(min = 1, message = "street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "province is required"))]
    pub province: String,
    #[validate(length(min = 1, message = "postal code is required"))]
    pub postal_code: String,
}

impl AddressForm {
    /// Validate and compose the one-line display address stored on
    /// the order.
    pub fn compose(&self) -> Result<String, ValidationError> {
        self.validate().map_err(|e| first_violation(&e))?;
        Ok(format!(
            "{}, {}, {} {}",
            self.street.trim(),
            self.city.trim(),
            self.province.trim(),
            self.postal_code.trim()
        ))
    }

    fn is_blank(&self) -> bool {
        self.street.is_empty()
            && self.city.is_empty()
            && self.province.is_empty()
            && self.postal_code.is_empty()
    }
}

/// Keep only kiosks a customer can actually collect from.
pub fn active_kiosks(kiosks: Vec<Kiosk>) -> Vec<Kiosk> {
    kiosks.into_iter().filter(|k| k.is_active).collect()
}

// ============================================================================
// Selector
// ============================================================================

/// Pending shipping input on the summary step.
#[derive(Debug, Clone, Default)]
pub struct ShippingSelector {
    kind: Option<ShippingKind>,
    address: AddressForm,
    kiosk_id: Option<String>,
}

impl ShippingSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<ShippingKind> {
        self.kind
    }

    pub fn address(&self) -> &AddressForm {
        &self.address
    }

    pub fn kiosk_id(&self) -> Option<&str> {
        self.kiosk_id.as_deref()
    }

    /// Switch to courier delivery with the given address form.
    /// Discards any kiosk selection.
    pub fn set_address(&mut self, address: AddressForm) {
        self.kind = Some(ShippingKind::Delivery);
        self.address = address;
        self.kiosk_id = None;
    }

    /// Switch to kiosk pickup. Discards any typed address.
    pub fn set_kiosk(&mut self, kiosk_id: impl Into<String>) {
        self.kind = Some(ShippingKind::KioskPickup);
        self.kiosk_id = Some(kiosk_id.into());
        self.address = AddressForm::default();
    }

    /// Resolve the selection against the kiosk directory.
    pub fn resolve(&self, kiosks: &[Kiosk]) -> Result<ShippingMethod, ValidationError> {
        match self.kind {
            None => Err(ValidationError::new(
                "shipping",
                "choose delivery or kiosk pickup",
            )),
            Some(ShippingKind::Delivery) => Ok(ShippingMethod::ToAddress(self.address.compose()?)),
            Some(ShippingKind::KioskPickup) => {
                let kiosk_id = self
                    .kiosk_id
                    .as_deref()
                    .ok_or_else(|| ValidationError::new("kiosk", "choose a pickup kiosk"))?;
                let kiosk = kiosks
                    .iter()
                    .find(|k| k.id == kiosk_id)
                    .ok_or_else(|| ValidationError::new("kiosk", "unknown pickup kiosk"))?;
                if !kiosk.is_active {
                    return Err(ValidationError::new("kiosk", "kiosk is not active"));
                }
                Ok(ShippingMethod::ToKiosk {
                    kiosk_id: kiosk.id.clone(),
                })
            }
        }
    }

    /// True when nothing (not even partial input) has been entered.
    pub fn is_untouched(&self) -> bool {
        self.kind.is_none() && self.address.is_blank() && self.kiosk_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kiosk(id: &str, active: bool) -> Kiosk {
        Kiosk {
            id: id.to_string(),
            name: format!("Branch {id}"),
            address: "12 Nguyen Hue".to_string(),
            is_active: active,
        }
    }

    fn full_address() -> AddressForm {
        AddressForm {
            street: "25 Le Loi".to_string(),
            city: "Da Nang".to_string(),
            province: "Da Nang".to_string(),
            postal_code: "550000".to_string(),
        }
    }

    #[test]
    fn composes_one_line_address() {
        assert_eq!(
            full_address().compose().unwrap(),
            "25 Le Loi, Da Nang, Da Nang 550000"
        );
    }

    #[test]
    fn blank_street_blocks_composition() {
        let mut form = full_address();
        form.street = String::new();
        let err = form.compose().unwrap_err();
        assert_eq!(err.field, "street");
    }

    #[test]
    fn choosing_kiosk_clears_partial_address() {
        let mut selector = ShippingSelector::new();
        let mut partial = full_address();
        partial.postal_code = String::new();
        selector.set_address(partial);

        selector.set_kiosk("k_1");
        assert_eq!(selector.kind(), Some(ShippingKind::KioskPickup));
        assert!(selector.address().is_blank(), "partial address must be dropped");

        let method = selector.resolve(&[kiosk("k_1", true)]).unwrap();
        assert_eq!(method, ShippingMethod::ToKiosk { kiosk_id: "k_1".into() });
    }

    #[test]
    fn choosing_address_clears_kiosk() {
        let mut selector = ShippingSelector::new();
        selector.set_kiosk("k_1");
        selector.set_address(full_address());

        assert_eq!(selector.kiosk_id(), None);
        let method = selector.resolve(&[]).unwrap();
        assert_eq!(method.kind(), ShippingKind::Delivery);
    }

    #[test]
    fn unresolved_selector_demands_a_choice() {
        let selector = ShippingSelector::new();
        let err = selector.resolve(&[]).unwrap_err();
        assert_eq!(err.field, "shipping");
    }

    #[test]
    fn inactive_kiosk_is_rejected() {
        let mut selector = ShippingSelector::new();
        selector.set_kiosk("k_2");
        let err = selector.resolve(&[kiosk("k_2", false)]).unwrap_err();
        assert_eq!(err.field, "kiosk");
    }

    #[test]
    fn unknown_kiosk_is_rejected() {
        let mut selector = ShippingSelector::new();
        selector.set_kiosk("k_9");
        let err = selector.resolve(&[kiosk("k_1", true)]).unwrap_err();
        assert_eq!(err.field, "kiosk");
    }

    #[test]
    fn active_kiosks_drops_closed_branches() {
        let kiosks = active_kiosks(vec![kiosk("k_1", true), kiosk("k_2", false)]);
        assert_eq!(kiosks.len(), 1);
        assert_eq!(kiosks[0].id, "k_1");
    }
}
