//! Error types for questline-core

use crate::shop::PurchaseId;
use thiserror::Error;

/// Why a refund request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RefundDenial {
    #[error("refund window expired")]
    WindowExpired,

    #[error("fulfillment already started")]
    AlreadyStarted,

    #[error("no such purchase")]
    UnknownPurchase,
}

/// Core error type
///
/// Every variant is a recoverable, user-visible rejection: the operation that
/// produced it left the account state untouched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("insufficient funds: need {needed} coins, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("refund not eligible for {purchase_id}: {reason}")]
    RefundNotEligible {
        purchase_id: PurchaseId,
        reason: RefundDenial,
    },

    #[error("unknown shop item: {0}")]
    UnknownItem(String),

    #[error("export error: {0}")]
    Export(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
