//! Catalog price index
//!
//! Cart lines store references, not price snapshots. Every total is
//! resolved against this view at read time, so a repriced frame
//! reaches the summary (and the voucher discount reprices with it)
//! without rewriting stored lines.

use shared::Amount;
use shared::models::{Frame, Lens};
use std::collections::HashMap;

/// Latest known unit prices, keyed by catalog ID.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    frame_prices: HashMap<String, Amount>,
    lens_prices: HashMap<String, Amount>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current price of a frame.
    pub fn upsert_frame(&mut self, frame: &Frame) {
        self.frame_prices.insert(frame.id.clone(), frame.price);
    }

    /// Record the current price of a lens.
    pub fn upsert_lens(&mut self, lens: &Lens) {
        self.lens_prices.insert(lens.id.clone(), lens.price);
    }

    /// Absorb a fetched frame listing.
    pub fn absorb_frames<'a>(&mut self, frames: impl IntoIterator<Item = &'a Frame>) {
        for frame in frames {
            self.upsert_frame(frame);
        }
    }

    /// Absorb a fetched lens listing.
    pub fn absorb_lenses<'a>(&mut self, lenses: impl IntoIterator<Item = &'a Lens>) {
        for lens in lenses {
            self.upsert_lens(lens);
        }
    }

    pub fn frame_price(&self, id: &str) -> Option<Amount> {
        self.frame_prices.get(id).copied()
    }

    pub fn lens_price(&self, id: &str) -> Option<Amount> {
        self.lens_prices.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_prices.is_empty() && self.lens_prices.is_empty()
    }
}
