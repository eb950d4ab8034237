//! Lens Models
//!
//! A lens belongs to a lens type (single vision, progressive, plano
//! fashion tint, ...) and carries a reflective coating. Whether the
//! staff must capture an optical prescription is a property of the
//! lens type, not of the individual lens.

use crate::types::Amount;
use serde::{Deserialize, Serialize};

/// Lens entity (one physical lens, sold per eye)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lens {
    pub id: String,
    pub name: String,
    /// Per-lens price in whole dong
    pub price: Amount,
    /// Lens type reference (String ID)
    pub lens_type_id: String,
    /// Reflective coating reference (String ID)
    pub coating_id: String,
    #[serde(default)]
    pub in_stock: bool,
    pub is_active: bool,
}

impl Lens {
    /// Whether the lens may be picked for a new order line.
    pub fn is_selectable(&self) -> bool {
        self.is_active && self.in_stock
    }
}

/// Lens type entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LensType {
    pub id: String,
    pub name: String,
    /// Lenses of this type are cut to an optical prescription.
    /// Plano fashion lenses set this to `false` and skip capture.
    pub requires_prescription: bool,
}

/// Reflective coating entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReflectiveCoating {
    pub id: String,
    pub name: String,
}

/// Lens list query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LensFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    /// Restrict to one lens type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens_type_id: Option<String>,
    /// Restrict to one coating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coating_id: Option<String>,
    /// Restrict to these IDs (price refresh lookups)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl LensFilter {
    /// Filter that resolves exactly the given IDs.
    pub fn by_ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}
