//! Optica Checkout - staff-assisted checkout engine
//!
//! Drives one sale through the four-step wizard: pick a frame, pick
//! and prescribe the lenses, pick the customer, then settle on the
//! summary step. Backend access goes through the [`gateway`] ports so
//! the engine stays transport-free.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod customer;
pub mod draft;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod money;
pub mod prescription;
pub mod shipping;
pub mod submit;
pub mod voucher;

pub use cart::{Cart, CartError, CartItem, CartStore, PricedCart, PricedLine};
pub use catalog::CatalogView;
pub use config::CheckoutConfig;
pub use error::ValidationError;
pub use flow::{CheckoutFlow, FlowError, Phase, Step, StepEpoch};
pub use gateway::{GatewayError, Gateways};
pub use money::{PriceQuote, RemainderRule};
pub use submit::{CheckoutOutcome, SubmissionError};
pub use voucher::{VoucherError, VoucherState, VoucherValidator};

// Gateway ports, implemented by optica-client and by test fakes
pub use gateway::{
    CatalogReader, CustomerDirectory, KioskDirectory, OrderGateway, PaymentGateway, VoucherGateway,
};
