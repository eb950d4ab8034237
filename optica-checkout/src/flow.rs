//! Checkout flow orchestration
//!
//! One [`CheckoutFlow`] drives one sale from the first frame pick to
//! the settled (or redirected) order. It is the single writer of the
//! cart, draft and voucher state; screens hold value snapshots only.
//!
//! # Steps
//!
//! ```text
//! ProductSelection → LensAndPrescription → CustomerSelection → Summary
//!        ▲                                        │                │
//!        └──────────── start_new_line ────────────┴────────────────┤
//!                                                                  ▼
//!                                   Submitting → Completed | RedirectedToGateway
//!                                        │
//!                                        ▼
//!                                      Failed ── acknowledge ──▶ Summary
//! ```
//!
//! Walking back never discards earlier selections; the line being
//! configured keeps its identity, so re-advancing rewrites it in
//! place instead of duplicating it.
//!
//! # Stale responses
//!
//! Step data arrives through `offer_*` hand-ins guarded by a step
//! epoch: navigating bumps the epoch, and a fetch that started under
//! an older epoch is discarded on arrival. The voucher panel has its
//! own, stricter guard ([`crate::voucher::VoucherValidator`]).

use crate::cart::{Cart, CartError, CartItem, CartStore, PricedCart};
use crate::catalog::CatalogView;
use crate::config::CheckoutConfig;
use crate::customer::NewCustomerForm;
use crate::draft::{DraftError, OrderDraft};
use crate::error::ValidationError;
use crate::gateway::{GatewayError, Gateways};
use crate::money::{self, PriceQuote};
use crate::prescription::{self, PrescriptionForm};
use crate::shipping::{self, AddressForm, ShippingSelector};
use crate::submit::{self, CheckoutOutcome, SubmissionError};
use crate::voucher::{VoucherState, VoucherValidator};
use futures::future::join_all;
use shared::envelope::Page;
use shared::models::{
    Account, AccountFilter, Frame, FrameFilter, Kiosk, Lens, LensFilter, LensType,
    ReflectiveCoating, Voucher,
};
use shared::order::{OrderConfirmation, PaymentMethod, PaymentRecord};
use thiserror::Error;

// ============================================================================
// Steps and Phases
// ============================================================================

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ProductSelection,
    LensAndPrescription,
    CustomerSelection,
    Summary,
}

/// Where the whole flow stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Wizard in progress at the given step
    InProgress(Step),
    /// Submission running; all inputs are frozen
    Submitting,
    /// Cash order settled; terminal
    Completed {
        confirmation: OrderConfirmation,
        payment: PaymentRecord,
    },
    /// Online order created, browser must follow `url`; terminal
    RedirectedToGateway { order_id: String, url: String },
    /// Submission failed; cart and draft are retained
    Failed { error: SubmissionError },
}

/// Step-data epoch. Fetches snapshot it before awaiting; `offer_*`
/// drops results whose epoch is no longer current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEpoch(u64);

/// Flow operation failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FlowError {
    /// The action does not exist in the current step or phase
    #[error("{action} is not available right now")]
    NotAvailable { action: &'static str },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

fn not_available(action: &'static str) -> FlowError {
    FlowError::NotAvailable { action }
}

// ============================================================================
// Flow
// ============================================================================

/// Orchestrates one staff-assisted sale.
pub struct CheckoutFlow {
    gateways: Gateways,
    config: CheckoutConfig,
    phase: Phase,
    epoch: u64,

    cart: CartStore,
    catalog: CatalogView,
    validator: VoucherValidator,
    draft: OrderDraft,
    shipping: ShippingSelector,

    // Line under configuration
    active_line: Option<String>,
    frame: Option<Frame>,
    left_lens: Option<Lens>,
    right_lens: Option<Lens>,
    rx_form: PrescriptionForm,

    // Step data, refreshed per step
    frames: Vec<Frame>,
    lenses: Vec<Lens>,
    lens_types: Vec<LensType>,
    coatings: Vec<ReflectiveCoating>,
    accounts: Vec<Account>,
    kiosks: Vec<Kiosk>,
}

impl CheckoutFlow {
    pub fn new(gateways: Gateways) -> Self {
        Self::with_config(gateways, CheckoutConfig::default())
    }

    pub fn with_config(gateways: Gateways, config: CheckoutConfig) -> Self {
        Self {
            gateways,
            config,
            phase: Phase::InProgress(Step::ProductSelection),
            epoch: 0,
            cart: CartStore::new(),
            catalog: CatalogView::new(),
            validator: VoucherValidator::new(),
            draft: OrderDraft::new(),
            shipping: ShippingSelector::new(),
            active_line: None,
            frame: None,
            left_lens: None,
            right_lens: None,
            rx_form: PrescriptionForm::default(),
            frames: Vec::new(),
            lenses: Vec::new(),
            lens_types: Vec::new(),
            coatings: Vec::new(),
            accounts: Vec::new(),
            kiosks: Vec::new(),
        }
    }

    // ========== Read access ==========

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn step(&self) -> Option<Step> {
        match self.phase {
            Phase::InProgress(step) => Some(step),
            _ => None,
        }
    }

    pub fn epoch(&self) -> StepEpoch {
        StepEpoch(self.epoch)
    }

    pub fn cart(&self) -> Cart {
        self.cart.snapshot()
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn voucher_state(&self) -> &VoucherState {
        self.validator.state()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn lenses(&self) -> &[Lens] {
        &self.lenses
    }

    pub fn lens_types(&self) -> &[LensType] {
        &self.lens_types
    }

    pub fn coatings(&self) -> &[ReflectiveCoating] {
        &self.coatings
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn kiosks(&self) -> &[Kiosk] {
        &self.kiosks
    }

    pub fn selected_frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn selected_lenses(&self) -> Option<(&Lens, &Lens)> {
        match (&self.left_lens, &self.right_lens) {
            (Some(l), Some(r)) => Some((l, r)),
            _ => None,
        }
    }

    // ========== Navigation ==========

    fn goto(&mut self, step: Step) -> Step {
        self.epoch += 1;
        self.phase = Phase::InProgress(step);
        tracing::debug!(step = ?step, epoch = self.epoch, "step changed");
        step
    }

    fn require_step(&self, expected: Step, action: &'static str) -> Result<(), FlowError> {
        if self.step() != Some(expected) {
            return Err(not_available(action));
        }
        Ok(())
    }

    /// Move forward. Each step validates its own exit condition; the
    /// lens step additionally commits (or rewrites) the active line.
    pub fn advance(&mut self) -> Result<Step, FlowError> {
        let step = self.step().ok_or_else(|| not_available("advance"))?;
        match step {
            Step::ProductSelection => {
                if self.frame.is_none() {
                    return Err(ValidationError::new("frame", "select a frame first").into());
                }
                Ok(self.goto(Step::LensAndPrescription))
            }
            Step::LensAndPrescription => {
                self.commit_active_line()?;
                Ok(self.goto(Step::CustomerSelection))
            }
            Step::CustomerSelection => {
                if self.draft.customer().is_none() {
                    return Err(ValidationError::new("customer", "select a customer").into());
                }
                Ok(self.goto(Step::Summary))
            }
            Step::Summary => Err(not_available("advance")),
        }
    }

    /// Move one step back. Selections made so far are kept; the line
    /// under configuration stays editable and will be rewritten in
    /// place on the next advance.
    pub fn back(&mut self) -> Result<Step, FlowError> {
        let step = self.step().ok_or_else(|| not_available("back"))?;
        match step {
            Step::ProductSelection => Err(not_available("back")),
            Step::LensAndPrescription => Ok(self.goto(Step::ProductSelection)),
            Step::CustomerSelection => Ok(self.goto(Step::LensAndPrescription)),
            Step::Summary => Ok(self.goto(Step::CustomerSelection)),
        }
    }

    /// Start configuring an additional line. The cart, customer,
    /// voucher and shipping decisions all survive; only the
    /// line-scoped inputs reset.
    pub fn start_new_line(&mut self) -> Result<Step, FlowError> {
        match self.step() {
            Some(Step::CustomerSelection) | Some(Step::Summary) => {
                self.active_line = None;
                self.frame = None;
                self.left_lens = None;
                self.right_lens = None;
                self.rx_form.clear();
                tracing::info!(lines = self.cart.len(), "starting an additional line");
                Ok(self.goto(Step::ProductSelection))
            }
            _ => Err(not_available("start_new_line")),
        }
    }

    // ========== Step data (epoch-guarded) ==========

    /// Hand in a frame listing fetched under `epoch`. Returns `false`
    /// when the result was stale and dropped.
    pub fn offer_frames(&mut self, epoch: StepEpoch, page: Page<Frame>) -> bool {
        if !self.admit_step_data(epoch, "frames") {
            return false;
        }
        self.catalog.absorb_frames(&page.items);
        self.frames = page.items;
        true
    }

    pub fn offer_lenses(&mut self, epoch: StepEpoch, page: Page<Lens>) -> bool {
        if !self.admit_step_data(epoch, "lenses") {
            return false;
        }
        self.catalog.absorb_lenses(&page.items);
        self.lenses = page.items;
        true
    }

    pub fn offer_lens_types(&mut self, epoch: StepEpoch, types: Vec<LensType>) -> bool {
        if !self.admit_step_data(epoch, "lens_types") {
            return false;
        }
        self.lens_types = types;
        true
    }

    pub fn offer_coatings(&mut self, epoch: StepEpoch, coatings: Vec<ReflectiveCoating>) -> bool {
        if !self.admit_step_data(epoch, "coatings") {
            return false;
        }
        self.coatings = coatings;
        true
    }

    pub fn offer_accounts(&mut self, epoch: StepEpoch, page: Page<Account>) -> bool {
        if !self.admit_step_data(epoch, "accounts") {
            return false;
        }
        // Inactive accounts are unusable, drop them at the door
        self.accounts = page.items.into_iter().filter(|a| a.is_active).collect();
        true
    }

    pub fn offer_kiosks(&mut self, epoch: StepEpoch, kiosks: Vec<Kiosk>) -> bool {
        if !self.admit_step_data(epoch, "kiosks") {
            return false;
        }
        self.kiosks = shipping::active_kiosks(kiosks);
        true
    }

    fn admit_step_data(&self, epoch: StepEpoch, what: &'static str) -> bool {
        if epoch.0 != self.epoch {
            tracing::debug!(
                data = what,
                fetched_at = epoch.0,
                current = self.epoch,
                "stale step data discarded"
            );
            return false;
        }
        true
    }

    /// Fetch and hand in frames for the product step.
    pub async fn load_frames(&mut self, filter: &FrameFilter) -> Result<(), FlowError> {
        let epoch = self.epoch();
        let page = self.gateways.catalog.list_frames(filter).await?;
        self.offer_frames(epoch, page);
        Ok(())
    }

    /// Fetch and hand in lenses plus the type and coating directories
    /// the lens step filters by.
    pub async fn load_lenses(&mut self, filter: &LensFilter) -> Result<(), FlowError> {
        let epoch = self.epoch();
        let (page, types, coatings) = futures::future::join3(
            self.gateways.catalog.list_lenses(filter),
            self.gateways.catalog.list_lens_types(),
            self.gateways.catalog.list_coatings(),
        )
        .await;
        self.offer_lenses(epoch, page?);
        self.offer_lens_types(epoch, types?);
        self.offer_coatings(epoch, coatings?);
        Ok(())
    }

    /// Search customer accounts by username fragment.
    pub async fn search_customers(&mut self, username_contains: &str) -> Result<(), FlowError> {
        let epoch = self.epoch();
        let filter = AccountFilter {
            username_contains: Some(username_contains.to_string()),
            ..AccountFilter::default()
        };
        let page = self.gateways.customers.search_accounts(&filter).await?;
        self.offer_accounts(epoch, page);
        Ok(())
    }

    /// Fetch the kiosk directory for the summary step.
    pub async fn load_kiosks(&mut self) -> Result<(), FlowError> {
        let epoch = self.epoch();
        let kiosks = self.gateways.kiosks.list_kiosks().await?;
        self.offer_kiosks(epoch, kiosks);
        Ok(())
    }

    // ========== Product selection ==========

    pub fn select_frame(&mut self, frame: Frame) -> Result<(), FlowError> {
        self.require_step(Step::ProductSelection, "select_frame")?;
        if !frame.is_sellable() {
            return Err(ValidationError::new("frame", "frame is not available for sale").into());
        }
        self.catalog.upsert_frame(&frame);
        tracing::debug!(frame = %frame.id, "frame selected");
        self.frame = Some(frame);
        Ok(())
    }

    // ========== Lens and prescription ==========

    /// Pick the lens for each eye. Both must be sellable and share a
    /// lens type, otherwise the prescription form would be ambiguous.
    pub fn select_lenses(&mut self, left: Lens, right: Lens) -> Result<(), FlowError> {
        self.require_step(Step::LensAndPrescription, "select_lenses")?;
        if !left.is_selectable() {
            return Err(ValidationError::new("left_lens", "lens is not available").into());
        }
        if !right.is_selectable() {
            return Err(ValidationError::new("right_lens", "lens is not available").into());
        }
        if left.lens_type_id != right.lens_type_id {
            return Err(ValidationError::new(
                "lens_type",
                "left and right lenses must share a lens type",
            )
            .into());
        }
        self.catalog.upsert_lens(&left);
        self.catalog.upsert_lens(&right);
        self.left_lens = Some(left);
        self.right_lens = Some(right);
        Ok(())
    }

    /// Mutable access to the prescription inputs.
    pub fn rx_form_mut(&mut self) -> &mut PrescriptionForm {
        &mut self.rx_form
    }

    /// The lens type governing the current line, once lenses are
    /// chosen and the type list is loaded.
    pub fn current_lens_type(&self) -> Option<&LensType> {
        let left = self.left_lens.as_ref()?;
        self.lens_types.iter().find(|t| t.id == left.lens_type_id)
    }

    /// Validate the line and write it into the cart. Re-entering this
    /// step rewrites the same line instead of adding a twin.
    fn commit_active_line(&mut self) -> Result<(), FlowError> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| ValidationError::new("frame", "select a frame first"))?;
        let (left, right) = match (&self.left_lens, &self.right_lens) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(ValidationError::new("lens", "select both lenses").into()),
        };
        let lens_type = self
            .lens_types
            .iter()
            .find(|t| t.id == left.lens_type_id)
            .ok_or_else(|| ValidationError::new("lens_type", "unknown lens type"))?;

        let rx = prescription::capture(lens_type, &self.rx_form)?;

        let item = match &self.active_line {
            Some(id) => {
                let quantity = self.cart.quantity_of(id).unwrap_or(1);
                CartItem::rebuilt(id.clone(), quantity, frame, left, right, rx)
            }
            None => CartItem::new(frame, left, right, rx),
        };
        let line_id = item.id.clone();
        self.cart.upsert(item);
        self.active_line = Some(line_id);
        tracing::info!(
            lines = self.cart.len(),
            frame = %frame.id,
            "line written to cart"
        );
        Ok(())
    }

    // ========== Cart edits ==========

    pub fn set_line_quantity(&mut self, line_id: &str, quantity: u32) -> Result<Cart, FlowError> {
        Ok(self.cart.set_quantity(line_id, quantity)?)
    }

    pub fn remove_line(&mut self, line_id: &str) -> Result<Cart, FlowError> {
        if self.active_line.as_deref() == Some(line_id) {
            self.active_line = None;
        }
        Ok(self.cart.remove(line_id)?)
    }

    // ========== Customer selection ==========

    pub fn select_customer(&mut self, account: Account) -> Result<(), FlowError> {
        self.require_step(Step::CustomerSelection, "select_customer")?;
        if !account.is_active {
            return Err(ValidationError::new("customer", "account is inactive").into());
        }
        tracing::debug!(account = %account.id, "customer selected");
        self.draft = std::mem::take(&mut self.draft).with_customer(account);
        Ok(())
    }

    /// Register a walk-in customer and select them in one move.
    pub async fn register_customer(&mut self, form: &NewCustomerForm) -> Result<(), FlowError> {
        self.require_step(Step::CustomerSelection, "register_customer")?;
        let payload = form.to_payload()?;
        let account = self.gateways.customers.create_account(&payload).await?;
        tracing::info!(account = %account.id, "walk-in customer registered");
        self.draft = std::mem::take(&mut self.draft).with_customer(account);
        Ok(())
    }

    // ========== Summary: voucher ==========

    /// Validate a voucher code and, when accepted, attach it to the
    /// draft. Applying over an applied voucher is rejected; remove it
    /// first.
    pub async fn apply_voucher(&mut self, raw_code: &str) -> Result<(), FlowError> {
        self.require_step(Step::Summary, "apply_voucher")?;
        if self.draft.voucher().is_some() {
            return Err(DraftError::VoucherAlreadyApplied.into());
        }
        let state = self
            .validator
            .validate(self.gateways.vouchers.as_ref(), raw_code)
            .await;
        if let VoucherState::Applied(voucher) = state {
            let voucher: Voucher = voucher.clone();
            // Attach on a copy; a refused attach must not cost the draft.
            self.draft = self.draft.clone().with_voucher(voucher)?;
        }
        Ok(())
    }

    pub fn remove_voucher(&mut self) -> Result<(), FlowError> {
        self.require_step(Step::Summary, "remove_voucher")?;
        self.validator.reset();
        self.draft = std::mem::take(&mut self.draft).without_voucher();
        Ok(())
    }

    // ========== Summary: shipping, deposit, payment ==========

    /// Choose courier delivery. The address must validate; partial
    /// kiosk input is discarded.
    pub fn set_delivery_address(&mut self, address: AddressForm) -> Result<(), FlowError> {
        self.require_step(Step::Summary, "set_delivery_address")?;
        self.shipping.set_address(address);
        let method = self.shipping.resolve(&self.kiosks)?;
        self.draft = std::mem::take(&mut self.draft).with_shipping(method);
        Ok(())
    }

    /// Choose kiosk pickup. The kiosk must be in the loaded active
    /// directory; partial address input is discarded.
    pub fn set_pickup_kiosk(&mut self, kiosk_id: &str) -> Result<(), FlowError> {
        self.require_step(Step::Summary, "set_pickup_kiosk")?;
        self.shipping.set_kiosk(kiosk_id);
        let method = self.shipping.resolve(&self.kiosks)?;
        self.draft = std::mem::take(&mut self.draft).with_shipping(method);
        Ok(())
    }

    pub fn set_deposit(&mut self, is_deposit: bool) -> Result<(), FlowError> {
        self.require_step(Step::Summary, "set_deposit")?;
        self.draft = std::mem::take(&mut self.draft).with_deposit(is_deposit);
        Ok(())
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), FlowError> {
        self.require_step(Step::Summary, "set_payment_method")?;
        self.draft = std::mem::take(&mut self.draft).with_payment_method(method);
        Ok(())
    }

    // ========== Summary: figures ==========

    /// Price breakdown for the current cart and draft. Always derived
    /// on the fly; a repriced catalog item changes the next call.
    pub fn quote(&self) -> PriceQuote {
        let subtotal = self.cart.snapshot().subtotal(&self.catalog);
        money::quote(
            subtotal,
            self.draft.voucher().map(|v| v.percent),
            self.draft.shipping().map(|s| s.kind()),
            self.draft.is_deposit(),
            &self.config,
        )
    }

    /// Per-line figures with the non-authoritative flag.
    pub fn priced_cart(&self) -> PricedCart {
        self.cart.snapshot().priced(&self.catalog)
    }

    /// Re-resolve every cart component price concurrently, one lookup
    /// per line and side. Failed lookups leave the previous price in
    /// place; returns `false` when any lookup failed so callers can
    /// mark the totals as non-authoritative.
    pub async fn refresh_cart_prices(&mut self) -> bool {
        let cart = self.cart.snapshot();
        if cart.is_empty() {
            return true;
        }

        // Filters must outlive the borrowed request futures
        let frame_filters: Vec<FrameFilter> = cart
            .items
            .iter()
            .map(|item| FrameFilter::by_ids([item.frame.id.clone()]))
            .collect();
        let lens_filters: Vec<LensFilter> = cart
            .items
            .iter()
            .map(|item| {
                LensFilter::by_ids([item.left_lens.id.clone(), item.right_lens.id.clone()])
            })
            .collect();

        let frame_fetches = frame_filters
            .iter()
            .map(|filter| self.gateways.catalog.list_frames(filter));
        let lens_fetches = lens_filters
            .iter()
            .map(|filter| self.gateways.catalog.list_lenses(filter));

        let (frame_pages, lens_pages) =
            futures::future::join(join_all(frame_fetches), join_all(lens_fetches)).await;

        let mut authoritative = true;
        for page in frame_pages {
            match page {
                Ok(page) => self.catalog.absorb_frames(&page.items),
                Err(err) => {
                    tracing::warn!(error = %err, "frame price refresh failed");
                    authoritative = false;
                }
            }
        }
        for page in lens_pages {
            match page {
                Ok(page) => self.catalog.absorb_lenses(&page.items),
                Err(err) => {
                    tracing::warn!(error = %err, "lens price refresh failed");
                    authoritative = false;
                }
            }
        }
        authoritative
    }

    // ========== Submission ==========

    /// Submit the order. Local validation runs before any request and
    /// leaves the wizard editable on failure. After a network failure
    /// the phase is [`Phase::Failed`] and the cart survives for a
    /// retry; on success the cart is destroyed with the flow state.
    pub async fn submit(&mut self) -> Result<(), FlowError> {
        match &self.phase {
            Phase::InProgress(Step::Summary) => {}
            Phase::Submitting => return Err(SubmissionError::AlreadySubmitting.into()),
            _ => return Err(not_available("submit")),
        }

        let cart = self.cart.snapshot();
        let payload = submit::build_payload(&cart, &self.draft)
            .map_err(SubmissionError::Invalid)?;
        money::validate_subtotal(cart.subtotal(&self.catalog))
            .map_err(SubmissionError::Invalid)?;

        self.phase = Phase::Submitting;
        tracing::info!(lines = payload.lines.len(), "submitting order");

        let outcome = submit::submit_order(
            self.gateways.orders.as_ref(),
            self.gateways.payments.as_ref(),
            &payload,
        )
        .await;

        match outcome {
            Ok(CheckoutOutcome::CashSettled {
                confirmation,
                payment,
            }) => {
                self.finish();
                self.phase = Phase::Completed {
                    confirmation,
                    payment,
                };
                Ok(())
            }
            Ok(CheckoutOutcome::RedirectedToGateway { order_id, url }) => {
                self.finish();
                self.phase = Phase::RedirectedToGateway { order_id, url };
                Ok(())
            }
            Err(error) => {
                tracing::error!(error = %error, "submission failed");
                self.phase = Phase::Failed {
                    error: error.clone(),
                };
                Err(error.into())
            }
        }
    }

    /// Leave the failure screen and return to the summary with the
    /// cart intact.
    pub fn acknowledge_failure(&mut self) -> Result<Step, FlowError> {
        match &self.phase {
            Phase::Failed { .. } => Ok(self.goto(Step::Summary)),
            _ => Err(not_available("acknowledge_failure")),
        }
    }

    /// Destroy per-sale state once the order is out the door.
    fn finish(&mut self) {
        self.cart.clear();
        self.validator.reset();
        self.draft = OrderDraft::new();
        self.active_line = None;
        self.frame = None;
        self.left_lens = None;
        self.right_lens = None;
        self.rx_form.clear();
        self.epoch += 1;
    }
}
