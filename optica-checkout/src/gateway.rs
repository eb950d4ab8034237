//! Backend gateway ports
//!
//! The engine never talks HTTP itself. It calls these traits; the
//! `optica-client` crate implements them against the retail backend,
//! and the tests swap in fakes.

use async_trait::async_trait;
use shared::envelope::Page;
use shared::models::{
    Account, AccountCreate, AccountFilter, Frame, FrameFilter, Kiosk, Lens, LensFilter, LensType,
    ReflectiveCoating, Voucher,
};
use shared::order::{CreateOrderPayload, OrderConfirmation, PaymentRecord, PaymentUrl};
use std::sync::Arc;
use thiserror::Error;

/// Transport-level failure, already stripped of HTTP specifics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The referenced resource does not exist (HTTP 404)
    #[error("resource not found")]
    NotFound,
    /// The backend rejected the request shape (HTTP 400)
    #[error("request rejected: {0}")]
    Malformed(String),
    /// The staff session is missing or stale (HTTP 401)
    #[error("not authenticated")]
    Unauthenticated,
    /// The staff session lacks the required permission (HTTP 403)
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The resource existed but is past its lifetime (HTTP 410)
    #[error("resource expired")]
    Expired,
    /// The request never produced an HTTP response
    #[error("network failure: {0}")]
    Network(String),
    /// Anything else, body preserved for diagnostics
    #[error("unexpected backend error: {0}")]
    Unknown(String),
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn list_frames(&self, filter: &FrameFilter) -> Result<Page<Frame>, GatewayError>;
    async fn list_lenses(&self, filter: &LensFilter) -> Result<Page<Lens>, GatewayError>;
    async fn list_lens_types(&self) -> Result<Vec<LensType>, GatewayError>;
    async fn list_coatings(&self) -> Result<Vec<ReflectiveCoating>, GatewayError>;
}

/// Voucher lookup by redemption code.
#[async_trait]
pub trait VoucherGateway: Send + Sync {
    async fn voucher_by_code(&self, code: &str) -> Result<Voucher, GatewayError>;
}

/// Customer account search and walk-in registration.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn search_accounts(&self, filter: &AccountFilter) -> Result<Page<Account>, GatewayError>;
    async fn create_account(&self, payload: &AccountCreate) -> Result<Account, GatewayError>;
}

/// Pickup kiosk directory.
#[async_trait]
pub trait KioskDirectory: Send + Sync {
    async fn list_kiosks(&self) -> Result<Vec<Kiosk>, GatewayError>;
}

/// Order submission.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(
        &self,
        payload: &CreateOrderPayload,
    ) -> Result<OrderConfirmation, GatewayError>;
}

/// Payment records and the online payment redirect.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn payment_by_order(&self, order_id: &str) -> Result<PaymentRecord, GatewayError>;
    async fn payment_url(&self, order_id: &str) -> Result<PaymentUrl, GatewayError>;
}

/// Bundle of every port the flow needs, cloneable per screen.
#[derive(Clone)]
pub struct Gateways {
    pub catalog: Arc<dyn CatalogReader>,
    pub vouchers: Arc<dyn VoucherGateway>,
    pub customers: Arc<dyn CustomerDirectory>,
    pub kiosks: Arc<dyn KioskDirectory>,
    pub orders: Arc<dyn OrderGateway>,
    pub payments: Arc<dyn PaymentGateway>,
}
