//! Voucher validation state machine
//!
//! Validation is split in two halves so the async gateway call can
//! happen outside the state: [`VoucherValidator::begin`] hands out a
//! request token, [`VoucherValidator::complete`] accepts an outcome
//! only if that token is still the newest one. A response to a code
//! the staff has since retyped is discarded instead of clobbering the
//! newer result.
//!
//! ```text
//!    Idle ──begin──▶ Validating ──complete(Ok)──▶ Applied
//!                        │  ▲                        │
//!                        │  └──begin (supersedes)────┤
//!                        └─────complete(Err)──▶ Rejected
//! ```

use crate::gateway::{GatewayError, VoucherGateway};
use shared::models::Voucher;
use thiserror::Error;

/// Why a voucher was not applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoucherError {
    /// Rejected locally, no request was made
    #[error("voucher code is empty")]
    EmptyCode,
    #[error("voucher not found")]
    NotFound,
    #[error("voucher code is malformed")]
    Malformed,
    #[error("staff session is not authenticated")]
    Unauthenticated,
    #[error("staff session may not redeem vouchers")]
    Forbidden,
    #[error("voucher is expired")]
    Expired,
    /// Every redemption has been used up
    #[error("voucher is fully redeemed")]
    Exhausted,
    /// Disabled by the back office
    #[error("voucher is inactive")]
    Inactive,
    #[error("network failure: {0}")]
    Network(String),
    #[error("voucher service error: {0}")]
    Unknown(String),
}

impl From<GatewayError> for VoucherError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound => Self::NotFound,
            GatewayError::Malformed(_) => Self::Malformed,
            GatewayError::Unauthenticated => Self::Unauthenticated,
            GatewayError::Forbidden(_) => Self::Forbidden,
            GatewayError::Expired => Self::Expired,
            GatewayError::Network(msg) => Self::Network(msg),
            GatewayError::Unknown(msg) => Self::Unknown(msg),
        }
    }
}

/// Identifies one validation request. Only the newest token may
/// deliver a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Where the voucher panel currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherState {
    /// No code entered
    Idle,
    /// A request for `code` is in flight
    Validating { code: String, token: RequestToken },
    /// Voucher accepted and counted into the quote
    Applied(Voucher),
    /// Last attempt failed; the code stays editable
    Rejected(VoucherError),
}

/// Admission check applied to every voucher the backend returns.
/// A voucher that exists can still be unusable.
fn admit(voucher: Voucher) -> Result<Voucher, VoucherError> {
    if voucher.quantity == 0 {
        return Err(VoucherError::Exhausted);
    }
    if !voucher.is_active {
        return Err(VoucherError::Inactive);
    }
    Ok(voucher)
}

/// Single-writer voucher panel state.
#[derive(Debug)]
pub struct VoucherValidator {
    state: VoucherState,
    latest: u64,
}

impl Default for VoucherValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl VoucherValidator {
    pub fn new() -> Self {
        Self {
            state: VoucherState::Idle,
            latest: 0,
        }
    }

    pub fn state(&self) -> &VoucherState {
        &self.state
    }

    /// The applied voucher, if any.
    pub fn applied(&self) -> Option<&Voucher> {
        match &self.state {
            VoucherState::Applied(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_validating(&self) -> bool {
        matches!(self.state, VoucherState::Validating { .. })
    }

    /// Start validating a code. Returns the token the eventual
    /// response must present, plus the normalized code to send.
    /// Codes are trimmed and uppercased; lookup is case-insensitive.
    /// An empty code fails locally without issuing a token.
    pub fn begin(&mut self, raw_code: &str) -> Result<(RequestToken, String), VoucherError> {
        let code = raw_code.trim().to_uppercase();
        if code.is_empty() {
            self.state = VoucherState::Rejected(VoucherError::EmptyCode);
            return Err(VoucherError::EmptyCode);
        }

        self.latest += 1;
        let token = RequestToken(self.latest);
        self.state = VoucherState::Validating {
            code: code.clone(),
            token,
        };
        Ok((token, code))
    }

    /// Deliver the outcome of a validation request. Returns `false`
    /// when the token was superseded and the outcome dropped.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<Voucher, VoucherError>,
    ) -> bool {
        if token.0 != self.latest {
            tracing::debug!(
                token = token.0,
                latest = self.latest,
                "stale voucher response discarded"
            );
            return false;
        }

        self.state = match outcome.and_then(admit) {
            Ok(voucher) => {
                tracing::info!(code = %voucher.code, percent = voucher.percent, "voucher applied");
                VoucherState::Applied(voucher)
            }
            Err(err) => {
                tracing::info!(error = %err, "voucher rejected");
                VoucherState::Rejected(err)
            }
        };
        true
    }

    /// Remove the voucher (or abandon a pending validation). Any
    /// in-flight response becomes stale.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.state = VoucherState::Idle;
    }

    /// Convenience wrapper: begin, call the gateway, complete.
    pub async fn validate(&mut self, gateway: &dyn VoucherGateway, raw_code: &str) -> &VoucherState {
        let Ok((token, code)) = self.begin(raw_code) else {
            return &self.state;
        };
        let outcome = gateway
            .voucher_by_code(&code)
            .await
            .map_err(VoucherError::from);
        self.complete(token, outcome);
        &self.state
    }
}
