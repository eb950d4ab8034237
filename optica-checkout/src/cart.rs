//! Cart store
//!
//! Single owner of the in-progress order lines. All mutation goes
//! through [`CartStore`]; readers get cheap [`Cart`] value snapshots.
//! A line references its frame and lenses by ID and never embeds a
//! price; see [`crate::catalog::CatalogView`] for resolution.

use crate::catalog::CatalogView;
use serde::Serialize;
use shared::Amount;
use shared::models::{Frame, Lens};
use shared::prescription::PrescriptionData;
use thiserror::Error;
use uuid::Uuid;

/// Maximum sets of one configuration on a single line
const MAX_QUANTITY: u32 = 999;

/// Cart operation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantity outside `1..=MAX_QUANTITY`; removal must be explicit
    #[error("quantity must be between 1 and {MAX_QUANTITY}, got {0}")]
    InvalidQuantity(u32),
    /// No line with that ID in the cart
    #[error("cart line not found: {0}")]
    LineNotFound(String),
}

/// Display reference to a catalog item. Carries the name so the cart
/// renders without a catalog round-trip; the price stays in the
/// catalog view.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
}

impl ProductRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn of_frame(frame: &Frame) -> Self {
        Self::new(&frame.id, &frame.name)
    }

    pub fn of_lens(lens: &Lens) -> Self {
        Self::new(&lens.id, &lens.name)
    }
}

/// One configured product: a frame plus a lens per eye, cut to one
/// prescription. `quantity` counts complete sets.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartItem {
    /// Line identity, minted client-side
    pub id: String,
    pub frame: ProductRef,
    pub left_lens: ProductRef,
    pub right_lens: ProductRef,
    pub prescription: PrescriptionData,
    pub quantity: u32,
}

impl CartItem {
    /// New line with quantity 1 and a fresh ID.
    pub fn new(frame: &Frame, left: &Lens, right: &Lens, prescription: PrescriptionData) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            frame: ProductRef::of_frame(frame),
            left_lens: ProductRef::of_lens(left),
            right_lens: ProductRef::of_lens(right),
            prescription,
            quantity: 1,
        }
    }

    /// Rebuild a line in place, keeping its identity and quantity.
    /// Used when the staff walks back through the wizard to change the
    /// frame or lenses of the line they just configured.
    pub fn rebuilt(
        id: String,
        quantity: u32,
        frame: &Frame,
        left: &Lens,
        right: &Lens,
        prescription: PrescriptionData,
    ) -> Self {
        Self {
            id,
            frame: ProductRef::of_frame(frame),
            left_lens: ProductRef::of_lens(left),
            right_lens: ProductRef::of_lens(right),
            prescription,
            quantity,
        }
    }

    /// Price of one set, if every component resolves.
    pub fn unit_price(&self, catalog: &CatalogView) -> Option<Amount> {
        let frame = catalog.frame_price(&self.frame.id)?;
        let left = catalog.lens_price(&self.left_lens.id)?;
        let right = catalog.lens_price(&self.right_lens.id)?;
        Some(frame + left + right)
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Immutable snapshot of the cart.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merchandise subtotal. Lines whose price cannot be resolved
    /// count as zero; use [`Cart::priced`] when the caller needs to
    /// know whether the figure is authoritative.
    pub fn subtotal(&self, catalog: &CatalogView) -> Amount {
        self.priced(catalog).subtotal
    }

    /// Resolve every line against the catalog view.
    pub fn priced(&self, catalog: &CatalogView) -> PricedCart {
        let mut lines = Vec::with_capacity(self.items.len());
        let mut subtotal: Amount = 0;
        let mut complete = true;

        for item in &self.items {
            let (unit_price, priced) = match item.unit_price(catalog) {
                Some(price) => (price, true),
                None => (0, false),
            };
            let line_total = unit_price * Amount::from(item.quantity);
            subtotal += line_total;
            complete &= priced;
            lines.push(PricedLine {
                item_id: item.id.clone(),
                unit_price,
                line_total,
                priced,
            });
        }

        PricedCart {
            lines,
            subtotal,
            complete,
        }
    }
}

/// One line with its resolved money figures.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PricedLine {
    pub item_id: String,
    pub unit_price: Amount,
    pub line_total: Amount,
    /// False when a component price was missing and counted as zero
    pub priced: bool,
}

/// Cart with resolved prices. `complete` is false when any line was
/// only partially priced, so the UI can mark the subtotal as
/// non-authoritative instead of hiding the whole summary.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: Amount,
    pub complete: bool,
}

// ============================================================================
// Store
// ============================================================================

/// Owning cart state. Constructed once per checkout flow and dropped
/// wholesale when the order completes.
#[derive(Debug, Default)]
pub struct CartStore {
    items: Vec<CartItem>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line, or replace the line with the same ID.
    pub fn upsert(&mut self, item: CartItem) -> Cart {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
        self.snapshot()
    }

    /// Remove a line by ID.
    pub fn remove(&mut self, line_id: &str) -> Result<Cart, CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != line_id);
        if self.items.len() == before {
            return Err(CartError::LineNotFound(line_id.to_string()));
        }
        Ok(self.snapshot())
    }

    /// Change the quantity of a line. Zero is rejected; removing a
    /// line is an explicit [`CartStore::remove`].
    pub fn set_quantity(&mut self, line_id: &str, quantity: u32) -> Result<Cart, CartError> {
        if quantity == 0 || quantity > MAX_QUANTITY {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;
        item.quantity = quantity;
        Ok(self.snapshot())
    }

    /// Quantity of a line, if present.
    pub fn quantity_of(&self, line_id: &str) -> Option<u32> {
        self.items.iter().find(|i| i.id == line_id).map(|i| i.quantity)
    }

    /// Drop every line.
    pub fn clear(&mut self) -> Cart {
        self.items.clear();
        self.snapshot()
    }

    /// Value snapshot for readers.
    pub fn snapshot(&self) -> Cart {
        Cart {
            items: self.items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_frame(id: &str, price: Amount) -> Frame {
        Frame {
            id: id.to_string(),
            name: format!("Frame {id}"),
            price,
            brand: None,
            image: None,
            stock: 5,
            is_active: true,
        }
    }

    fn test_lens(id: &str, price: Amount) -> Lens {
        Lens {
            id: id.to_string(),
            name: format!("Lens {id}"),
            price,
            lens_type_id: "lt_single".to_string(),
            coating_id: "c_green".to_string(),
            in_stock: true,
            is_active: true,
        }
    }

    fn seeded() -> (CartStore, CatalogView, CartItem) {
        let frame = test_frame("f1", 1_200_000);
        let left = test_lens("l1", 750_000);
        let right = test_lens("l2", 750_000);

        let mut catalog = CatalogView::new();
        catalog.upsert_frame(&frame);
        catalog.upsert_lens(&left);
        catalog.upsert_lens(&right);

        let item = CartItem::new(&frame, &left, &right, PrescriptionData::none());
        let mut store = CartStore::new();
        store.upsert(item.clone());
        (store, catalog, item)
    }

    #[test]
    fn add_line_and_resolve_subtotal() {
        let (store, catalog, _) = seeded();
        let cart = store.snapshot();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal(&catalog), 2_700_000);
    }

    #[test]
    fn quantity_scales_the_line_total() {
        let (mut store, catalog, item) = seeded();
        store.set_quantity(&item.id, 3).unwrap();
        assert_eq!(store.snapshot().subtotal(&catalog), 8_100_000);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let (mut store, _, item) = seeded();
        assert_eq!(
            store.set_quantity(&item.id, 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert_eq!(store.len(), 1, "line must survive a rejected update");
    }

    #[test]
    fn quantity_above_bound_is_rejected() {
        let (mut store, _, item) = seeded();
        assert_eq!(
            store.set_quantity(&item.id, 1_000),
            Err(CartError::InvalidQuantity(1_000))
        );
    }

    #[test]
    fn remove_unknown_line_errors() {
        let (mut store, _, _) = seeded();
        assert_eq!(
            store.remove("nope"),
            Err(CartError::LineNotFound("nope".to_string()))
        );
    }

    #[test]
    fn remove_then_snapshot_is_empty() {
        let (mut store, _, item) = seeded();
        let cart = store.remove(&item.id).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn upsert_with_same_id_replaces_not_duplicates() {
        let (mut store, catalog, item) = seeded();
        let new_frame = test_frame("f2", 900_000);
        let left = test_lens("l1", 750_000);
        let right = test_lens("l2", 750_000);
        let mut catalog = catalog;
        catalog.upsert_frame(&new_frame);

        let rebuilt = CartItem::rebuilt(
            item.id.clone(),
            item.quantity,
            &new_frame,
            &left,
            &right,
            PrescriptionData::none(),
        );
        let cart = store.upsert(rebuilt);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items[0].frame.id, "f2");
        assert_eq!(cart.subtotal(&catalog), 2_400_000);
    }

    #[test]
    fn reprice_through_catalog_changes_snapshot_total() {
        let (mut store, mut catalog, _) = seeded();

        // Second line holds the same frame; only the lenses differ.
        let left = test_lens("l3", 350_000);
        let right = test_lens("l4", 350_000);
        catalog.upsert_lens(&left);
        catalog.upsert_lens(&right);
        store.upsert(CartItem::new(
            &test_frame("f1", 1_200_000),
            &left,
            &right,
            PrescriptionData::none(),
        ));

        let cart = store.snapshot();
        assert_eq!(cart.subtotal(&catalog), 4_600_000);

        // Backend repriced the frame between steps; the same snapshot
        // resolves every line holding the reference to the new figure.
        catalog.upsert_frame(&test_frame("f1", 1_400_000));
        assert_eq!(
            cart.subtotal(&catalog),
            5_000_000,
            "one catalog write moves both lines"
        );
    }

    #[test]
    fn missing_price_counts_zero_and_flags_incomplete() {
        let (store, _, item) = seeded();
        let empty_catalog = CatalogView::new();
        let priced = store.snapshot().priced(&empty_catalog);
        assert_eq!(priced.subtotal, 0);
        assert!(!priced.complete);
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].item_id, item.id);
        assert!(!priced.lines[0].priced);
    }
}
