//! Typed API surface and gateway implementations
//!
//! One [`OpticaClient`] implements every port the checkout engine
//! needs. The typed methods speak the backend's envelope and query
//! conventions; the trait implementations adapt errors down to
//! [`GatewayError`] so the engine never sees HTTP.

use crate::error::ClientResult;
use crate::http::{HttpClient, take_data};
use crate::config::ClientConfig;
use async_trait::async_trait;
use optica_checkout::gateway::{
    CatalogReader, CustomerDirectory, GatewayError, Gateways, KioskDirectory, OrderGateway,
    PaymentGateway, VoucherGateway,
};
use shared::envelope::{ApiEnvelope, Page};
use shared::models::{
    Account, AccountCreate, AccountFilter, Frame, FrameFilter, Kiosk, Lens, LensFilter, LensType,
    ReflectiveCoating, Voucher,
};
use shared::order::{CreateOrderPayload, OrderConfirmation, PaymentRecord, PaymentUrl};
use std::sync::Arc;

/// API client for the retail backend.
#[derive(Debug, Clone)]
pub struct OpticaClient {
    http: HttpClient,
}

impl OpticaClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: HttpClient::new(config),
        }
    }

    /// Set the staff session token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.http = self.http.with_token(token);
        self
    }

    /// Bundle this client into the gateway set the checkout flow
    /// consumes. All ports share one connection pool.
    pub fn gateways(&self) -> Gateways {
        let client = Arc::new(self.clone());
        Gateways {
            catalog: client.clone(),
            vouchers: client.clone(),
            customers: client.clone(),
            kiosks: client.clone(),
            orders: client.clone(),
            payments: client,
        }
    }

    // ========== Catalog API ==========

    /// List frames matching the filter.
    pub async fn frames(&self, filter: &FrameFilter) -> ClientResult<Page<Frame>> {
        let envelope: ApiEnvelope<Page<Frame>> = self
            .http
            .get_with_query("api/frames", &frame_query(filter))
            .await?;
        take_data(envelope, "frame page")
    }

    /// List lenses matching the filter.
    pub async fn lenses(&self, filter: &LensFilter) -> ClientResult<Page<Lens>> {
        let envelope: ApiEnvelope<Page<Lens>> = self
            .http
            .get_with_query("api/lenses", &lens_query(filter))
            .await?;
        take_data(envelope, "lens page")
    }

    /// List every lens type.
    pub async fn lens_types(&self) -> ClientResult<Vec<LensType>> {
        let envelope: ApiEnvelope<Vec<LensType>> = self.http.get("api/lens-types").await?;
        take_data(envelope, "lens types")
    }

    /// List every reflective coating.
    pub async fn coatings(&self) -> ClientResult<Vec<ReflectiveCoating>> {
        let envelope: ApiEnvelope<Vec<ReflectiveCoating>> = self.http.get("api/coatings").await?;
        take_data(envelope, "coatings")
    }

    // ========== Voucher API ==========

    /// Look a voucher up by its redemption code.
    pub async fn voucher_by_code(&self, code: &str) -> ClientResult<Voucher> {
        let envelope: ApiEnvelope<Voucher> = self
            .http
            .get(&format!("api/vouchers/code/{code}"))
            .await?;
        take_data(envelope, "voucher")
    }

    /// Fetch a voucher by ID (back-office views; redemption goes by code).
    pub async fn voucher_by_id(&self, id: &str) -> ClientResult<Voucher> {
        let envelope: ApiEnvelope<Voucher> = self.http.get(&format!("api/vouchers/{id}")).await?;
        take_data(envelope, "voucher")
    }

    // ========== Customer API ==========

    /// Search customer accounts.
    pub async fn accounts(&self, filter: &AccountFilter) -> ClientResult<Page<Account>> {
        let envelope: ApiEnvelope<Page<Account>> = self
            .http
            .get_with_query("api/accounts", &account_query(filter))
            .await?;
        take_data(envelope, "account page")
    }

    /// Register a walk-in customer.
    pub async fn register_account(&self, payload: &AccountCreate) -> ClientResult<Account> {
        let envelope: ApiEnvelope<Account> = self.http.post("api/accounts", payload).await?;
        take_data(envelope, "account")
    }

    // ========== Kiosk API ==========

    /// List the pickup kiosk directory.
    pub async fn kiosks(&self) -> ClientResult<Vec<Kiosk>> {
        let envelope: ApiEnvelope<Vec<Kiosk>> = self.http.get("api/kiosks").await?;
        take_data(envelope, "kiosks")
    }

    // ========== Order API ==========

    /// Submit an order.
    pub async fn submit_order(
        &self,
        payload: &CreateOrderPayload,
    ) -> ClientResult<OrderConfirmation> {
        let envelope: ApiEnvelope<OrderConfirmation> =
            self.http.post("api/orders", payload).await?;
        let confirmation = take_data(envelope, "order confirmation")?;
        tracing::info!(order_id = %confirmation.order_id, "order created");
        Ok(confirmation)
    }

    /// Fetch an existing order, e.g. after a payment gateway outage.
    pub async fn order_by_id(&self, order_id: &str) -> ClientResult<OrderConfirmation> {
        let envelope: ApiEnvelope<OrderConfirmation> =
            self.http.get(&format!("api/orders/{order_id}")).await?;
        take_data(envelope, "order")
    }

    /// Fetch the payment record of an order.
    pub async fn order_payment(&self, order_id: &str) -> ClientResult<PaymentRecord> {
        let envelope: ApiEnvelope<PaymentRecord> = self
            .http
            .get(&format!("api/orders/{order_id}/payment"))
            .await?;
        take_data(envelope, "payment record")
    }

    /// Fetch the online payment redirect for an order.
    pub async fn order_payment_url(&self, order_id: &str) -> ClientResult<PaymentUrl> {
        let envelope: ApiEnvelope<PaymentUrl> = self
            .http
            .get(&format!("api/orders/{order_id}/payment-url"))
            .await?;
        take_data(envelope, "payment url")
    }
}

// ============================================================================
// Query builders
// ============================================================================

// The backend takes ID lists as one comma-separated parameter, so the
// filters cannot go through plain struct serialization.

fn push_paging(query: &mut Vec<(&'static str, String)>, page: Option<u32>, page_size: Option<u32>) {
    if let Some(page) = page {
        query.push(("page", page.to_string()));
    }
    if let Some(page_size) = page_size {
        query.push(("page_size", page_size.to_string()));
    }
}

fn frame_query(filter: &FrameFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(name) = &filter.name_contains {
        query.push(("name_contains", name.clone()));
    }
    if let Some(ids) = &filter.ids {
        query.push(("ids", ids.join(",")));
    }
    push_paging(&mut query, filter.page, filter.page_size);
    query
}

fn lens_query(filter: &LensFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(name) = &filter.name_contains {
        query.push(("name_contains", name.clone()));
    }
    if let Some(lens_type_id) = &filter.lens_type_id {
        query.push(("lens_type_id", lens_type_id.clone()));
    }
    if let Some(coating_id) = &filter.coating_id {
        query.push(("coating_id", coating_id.clone()));
    }
    if let Some(ids) = &filter.ids {
        query.push(("ids", ids.join(",")));
    }
    push_paging(&mut query, filter.page, filter.page_size);
    query
}

fn account_query(filter: &AccountFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(username) = &filter.username_contains {
        query.push(("username_contains", username.clone()));
    }
    if let Some(role_id) = &filter.role_id {
        query.push(("role_id", role_id.clone()));
    }
    push_paging(&mut query, filter.page, filter.page_size);
    query
}

// ============================================================================
// Gateway implementations
// ============================================================================

#[async_trait]
impl CatalogReader for OpticaClient {
    async fn list_frames(&self, filter: &FrameFilter) -> Result<Page<Frame>, GatewayError> {
        self.frames(filter).await.map_err(Into::into)
    }

    async fn list_lenses(&self, filter: &LensFilter) -> Result<Page<Lens>, GatewayError> {
        self.lenses(filter).await.map_err(Into::into)
    }

    async fn list_lens_types(&self) -> Result<Vec<LensType>, GatewayError> {
        self.lens_types().await.map_err(Into::into)
    }

    async fn list_coatings(&self) -> Result<Vec<ReflectiveCoating>, GatewayError> {
        self.coatings().await.map_err(Into::into)
    }
}

#[async_trait]
impl VoucherGateway for OpticaClient {
    async fn voucher_by_code(&self, code: &str) -> Result<Voucher, GatewayError> {
        OpticaClient::voucher_by_code(self, code)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl CustomerDirectory for OpticaClient {
    async fn search_accounts(&self, filter: &AccountFilter) -> Result<Page<Account>, GatewayError> {
        self.accounts(filter).await.map_err(Into::into)
    }

    async fn create_account(&self, payload: &AccountCreate) -> Result<Account, GatewayError> {
        self.register_account(payload).await.map_err(Into::into)
    }
}

#[async_trait]
impl KioskDirectory for OpticaClient {
    async fn list_kiosks(&self) -> Result<Vec<Kiosk>, GatewayError> {
        self.kiosks().await.map_err(Into::into)
    }
}

#[async_trait]
impl OrderGateway for OpticaClient {
    async fn create_order(
        &self,
        payload: &CreateOrderPayload,
    ) -> Result<OrderConfirmation, GatewayError> {
        self.submit_order(payload).await.map_err(Into::into)
    }
}

#[async_trait]
impl PaymentGateway for OpticaClient {
    async fn payment_by_order(&self, order_id: &str) -> Result<PaymentRecord, GatewayError> {
        self.order_payment(order_id).await.map_err(Into::into)
    }

    async fn payment_url(&self, order_id: &str) -> Result<PaymentUrl, GatewayError> {
        self.order_payment_url(order_id).await.map_err(Into::into)
    }
}
