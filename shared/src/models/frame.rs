//! Frame Model

use crate::types::Amount;
use serde::{Deserialize, Serialize};

/// Eyeglass frame entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    pub id: String,
    pub name: String,
    /// Current unit price in whole dong
    pub price: Amount,
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Units on hand at the store
    #[serde(default)]
    pub stock: i32,
    pub is_active: bool,
}

impl Frame {
    /// Whether the frame may be offered for sale.
    pub fn is_sellable(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

/// Frame list query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameFilter {
    /// Substring match on the frame name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    /// Restrict to these IDs (price refresh lookups)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// 1-based page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl FrameFilter {
    /// Filter that resolves exactly the given IDs.
    pub fn by_ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}
