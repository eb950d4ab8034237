//! Order submission
//!
//! Validation happens before any network call: a draft missing its
//! customer, shipping or payment method fails fast while the staff
//! can still fix it. After the order is created the flow forks on the
//! payment method, and any failure past that point keeps the created
//! order ID visible instead of silently dropping it.

use crate::cart::Cart;
use crate::draft::OrderDraft;
use crate::error::ValidationError;
use crate::gateway::{GatewayError, OrderGateway, PaymentGateway};
use crate::shipping::ShippingMethod;
use shared::order::{
    CreateOrderPayload, OrderConfirmation, OrderLine, PaymentMethod, PaymentRecord, ShippingKind,
};
use thiserror::Error;

/// How a successful submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Cash order settled at the counter, payment record fetched
    CashSettled {
        confirmation: OrderConfirmation,
        payment: PaymentRecord,
    },
    /// Online order created; the browser must follow `url`
    RedirectedToGateway { order_id: String, url: String },
}

/// Submission failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmissionError {
    /// Rejected locally before any request was made
    #[error("order is not ready: {0}")]
    Invalid(#[from] ValidationError),
    /// The backend refused to create the order
    #[error("order rejected: {0}")]
    OrderRejected(GatewayError),
    /// Order created, but the cash payment record could not be read
    #[error("order {order_id} created, but reading its payment failed: {source}")]
    PaymentRecordUnavailable {
        order_id: String,
        source: GatewayError,
    },
    /// Order created, but no redirect URL could be obtained
    #[error("order {order_id} created, but the payment gateway is unavailable: {source}")]
    PaymentGatewayUnavailable {
        order_id: String,
        source: GatewayError,
    },
    /// A submission for this flow is already in flight
    #[error("a submission is already in flight")]
    AlreadySubmitting,
}

impl SubmissionError {
    /// The order ID when an order was created before the failure.
    /// Staff support needs it to reconcile the half-finished sale.
    pub fn created_order_id(&self) -> Option<&str> {
        match self {
            Self::PaymentRecordUnavailable { order_id, .. }
            | Self::PaymentGatewayUnavailable { order_id, .. } => Some(order_id),
            _ => None,
        }
    }
}

/// Build the order payload from the cart and draft, validating that
/// every required decision has been made. Pure; no I/O.
pub fn build_payload(cart: &Cart, draft: &OrderDraft) -> Result<CreateOrderPayload, ValidationError> {
    if cart.is_empty() {
        return Err(ValidationError::new("cart", "cart is empty"));
    }
    let customer = draft
        .customer()
        .ok_or_else(|| ValidationError::new("customer", "select a customer"))?;
    let shipping = draft
        .shipping()
        .ok_or_else(|| ValidationError::new("shipping", "choose delivery or kiosk pickup"))?;
    let payment_method = draft
        .payment_method()
        .ok_or_else(|| ValidationError::new("payment_method", "choose a payment method"))?;

    // The wizard validates shipping on entry, but the draft is plain
    // data anyone can assemble; the payload must never carry a blank
    // destination.
    let (shipping_kind, address, kiosk_id) = match shipping {
        ShippingMethod::ToAddress(addr) => {
            let addr = addr.trim();
            if addr.is_empty() {
                return Err(ValidationError::new("address", "delivery address is empty"));
            }
            (ShippingKind::Delivery, Some(addr.to_string()), None)
        }
        ShippingMethod::ToKiosk { kiosk_id } => {
            if kiosk_id.is_empty() {
                return Err(ValidationError::new("kiosk", "choose a pickup kiosk"));
            }
            (ShippingKind::KioskPickup, None, Some(kiosk_id.clone()))
        }
    };

    let lines = cart
        .items
        .iter()
        .map(|item| OrderLine {
            frame_id: item.frame.id.clone(),
            left_lens_id: item.left_lens.id.clone(),
            right_lens_id: item.right_lens.id.clone(),
            prescription: item.prescription,
            quantity: item.quantity,
        })
        .collect();

    Ok(CreateOrderPayload {
        customer_id: customer.id.clone(),
        shipping_kind,
        address,
        kiosk_id,
        voucher_id: draft.voucher().map(|v| v.id.clone()),
        is_deposit: draft.is_deposit(),
        payment_method,
        lines,
    })
}

/// Create the order, then settle or redirect depending on the payment
/// method.
pub async fn submit_order(
    orders: &dyn OrderGateway,
    payments: &dyn PaymentGateway,
    payload: &CreateOrderPayload,
) -> Result<CheckoutOutcome, SubmissionError> {
    let confirmation = orders
        .create_order(payload)
        .await
        .map_err(SubmissionError::OrderRejected)?;
    tracing::info!(
        order_id = %confirmation.order_id,
        lines = payload.lines.len(),
        total = confirmation.total,
        method = ?payload.payment_method,
        "order accepted"
    );

    match payload.payment_method {
        PaymentMethod::Cash => {
            let payment = payments
                .payment_by_order(&confirmation.order_id)
                .await
                .map_err(|source| SubmissionError::PaymentRecordUnavailable {
                    order_id: confirmation.order_id.clone(),
                    source,
                })?;
            Ok(CheckoutOutcome::CashSettled {
                confirmation,
                payment,
            })
        }
        PaymentMethod::Online => {
            let target = payments
                .payment_url(&confirmation.order_id)
                .await
                .map_err(|source| SubmissionError::PaymentGatewayUnavailable {
                    order_id: confirmation.order_id.clone(),
                    source,
                })?;
            Ok(CheckoutOutcome::RedirectedToGateway {
                order_id: confirmation.order_id,
                url: target.url,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartItem, CartStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use shared::models::{Account, Frame, Lens};
    use shared::order::{OrderStatus, PaymentStatus, PaymentUrl};
    use shared::prescription::PrescriptionData;

    fn test_cart() -> Cart {
        let frame = Frame {
            id: "f1".to_string(),
            name: "Aviator".to_string(),
            price: 1_200_000,
            brand: None,
            image: None,
            stock: 3,
            is_active: true,
        };
        let lens = |id: &str| Lens {
            id: id.to_string(),
            name: format!("Lens {id}"),
            price: 750_000,
            lens_type_id: "lt_single".to_string(),
            coating_id: "c_green".to_string(),
            in_stock: true,
            is_active: true,
        };
        let mut store = CartStore::new();
        store.upsert(CartItem::new(
            &frame,
            &lens("l1"),
            &lens("l2"),
            PrescriptionData::none(),
        ));
        store.snapshot()
    }

    fn ready_draft() -> OrderDraft {
        OrderDraft::new()
            .with_customer(Account {
                id: "acc_1".to_string(),
                username: "lan.tran".to_string(),
                full_name: "Tran Thi Lan".to_string(),
                phone: None,
                email: None,
                is_active: true,
            })
            .with_shipping(ShippingMethod::ToAddress("25 Le Loi, Da Nang".to_string()))
            .with_deposit(true)
            .with_payment_method(PaymentMethod::Cash)
    }

    fn confirmation(order_id: &str) -> OrderConfirmation {
        OrderConfirmation {
            order_id: order_id.to_string(),
            status: OrderStatus::Pending,
            item_count: 1,
            total: 2_730_000,
            amount_due: 759_000,
            created_at: Utc::now(),
        }
    }

    struct FakeOrders;

    #[async_trait]
    impl OrderGateway for FakeOrders {
        async fn create_order(
            &self,
            _payload: &CreateOrderPayload,
        ) -> Result<OrderConfirmation, GatewayError> {
            Ok(confirmation("ord_77"))
        }
    }

    struct BrokenPayments;

    #[async_trait]
    impl PaymentGateway for BrokenPayments {
        async fn payment_by_order(&self, _order_id: &str) -> Result<PaymentRecord, GatewayError> {
            Err(GatewayError::Network("connection reset".into()))
        }
        async fn payment_url(&self, _order_id: &str) -> Result<PaymentUrl, GatewayError> {
            Err(GatewayError::Unknown("gateway 502".into()))
        }
    }

    struct WorkingPayments;

    #[async_trait]
    impl PaymentGateway for WorkingPayments {
        async fn payment_by_order(&self, order_id: &str) -> Result<PaymentRecord, GatewayError> {
            Ok(PaymentRecord {
                id: "pay_1".to_string(),
                order_id: order_id.to_string(),
                method: PaymentMethod::Cash,
                amount: 759_000,
                status: PaymentStatus::Completed,
                created_at: Utc::now(),
            })
        }
        async fn payment_url(&self, _order_id: &str) -> Result<PaymentUrl, GatewayError> {
            Ok(PaymentUrl {
                url: "https://pay.example/redirect/ord_77".to_string(),
            })
        }
    }

    // ========================================================================
    // Payload building
    // ========================================================================

    #[test]
    fn empty_cart_fails_before_any_request() {
        let err = build_payload(&Cart::default(), &ready_draft()).unwrap_err();
        assert_eq!(err.field, "cart");
    }

    #[test]
    fn missing_decisions_are_reported_in_order() {
        let cart = test_cart();
        let draft = OrderDraft::new();
        assert_eq!(build_payload(&cart, &draft).unwrap_err().field, "customer");

        let draft = ready_draft();
        let payload = build_payload(&cart, &draft).unwrap();
        assert_eq!(payload.customer_id, "acc_1");
        assert_eq!(payload.shipping_kind, ShippingKind::Delivery);
        assert_eq!(payload.kiosk_id, None);
        assert_eq!(payload.lines.len(), 1);
        assert!(payload.is_deposit);
    }

    #[test]
    fn kiosk_shipping_puts_kiosk_id_on_the_payload() {
        let draft = ready_draft().with_shipping(ShippingMethod::ToKiosk {
            kiosk_id: "k_1".to_string(),
        });
        let payload = build_payload(&test_cart(), &draft).unwrap();
        assert_eq!(payload.shipping_kind, ShippingKind::KioskPickup);
        assert_eq!(payload.kiosk_id.as_deref(), Some("k_1"));
        assert_eq!(payload.address, None);
    }

    #[test]
    fn blank_destination_fails_before_any_request() {
        let draft = ready_draft().with_shipping(ShippingMethod::ToAddress("   ".to_string()));
        let err = build_payload(&test_cart(), &draft).unwrap_err();
        assert_eq!(err.field, "address");

        let draft = ready_draft().with_shipping(ShippingMethod::ToKiosk {
            kiosk_id: String::new(),
        });
        let err = build_payload(&test_cart(), &draft).unwrap_err();
        assert_eq!(err.field, "kiosk");
    }

    // ========================================================================
    // Submission branches
    // ========================================================================

    #[tokio::test]
    async fn cash_order_fetches_payment_record() {
        let payload = build_payload(&test_cart(), &ready_draft()).unwrap();
        let outcome = submit_order(&FakeOrders, &WorkingPayments, &payload)
            .await
            .unwrap();
        match outcome {
            CheckoutOutcome::CashSettled { confirmation, payment } => {
                assert_eq!(confirmation.order_id, "ord_77");
                assert_eq!(payment.order_id, "ord_77");
                assert_eq!(payment.status, PaymentStatus::Completed);
            }
            other => panic!("expected cash settlement, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn online_order_returns_redirect() {
        let draft = ready_draft().with_payment_method(PaymentMethod::Online);
        let payload = build_payload(&test_cart(), &draft).unwrap();
        let outcome = submit_order(&FakeOrders, &WorkingPayments, &payload)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CheckoutOutcome::RedirectedToGateway {
                order_id: "ord_77".to_string(),
                url: "https://pay.example/redirect/ord_77".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn gateway_outage_keeps_created_order_id() {
        let draft = ready_draft().with_payment_method(PaymentMethod::Online);
        let payload = build_payload(&test_cart(), &draft).unwrap();
        let err = submit_order(&FakeOrders, &BrokenPayments, &payload)
            .await
            .unwrap_err();
        assert_eq!(err.created_order_id(), Some("ord_77"));
        assert!(matches!(
            err,
            SubmissionError::PaymentGatewayUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn cash_lookup_failure_keeps_created_order_id() {
        let payload = build_payload(&test_cart(), &ready_draft()).unwrap();
        let err = submit_order(&FakeOrders, &BrokenPayments, &payload)
            .await
            .unwrap_err();
        assert_eq!(err.created_order_id(), Some("ord_77"));
        assert!(matches!(
            err,
            SubmissionError::PaymentRecordUnavailable { .. }
        ));
    }
}
