//! Payment errors.

use rust_decimal::Decimal;
use tallybook_shared::ErrorKind;
use thiserror::Error;

use crate::document::{DocumentKind, DocumentStatus};
use crate::payment::cheque::ChequeStatus;

/// Errors raised while recording or reversing a payment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Amount is zero or negative.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The document kind never takes payments.
    #[error("Payments cannot be recorded against a {0}")]
    NotPayable(DocumentKind),

    /// The document is a draft or closed.
    #[error("Payments cannot be recorded against a document in status {0}")]
    DocumentNotOpen(DocumentStatus),

    /// Unlinked payments must say which way the money moves.
    #[error("Payment direction is required when no document is linked")]
    DirectionRequired,

    /// Unlinked payments must name a party.
    #[error("Payment party is required when no document is linked")]
    PartyRequired,

    /// Cheque cannot move between these states.
    #[error("Invalid cheque transition from {from} to {to}")]
    InvalidChequeTransition {
        /// Current status.
        from: ChequeStatus,
        /// Requested status.
        to: ChequeStatus,
    },
}

impl PaymentError {
    /// Returns the error code for display layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "INVALID_PAYMENT_AMOUNT",
            Self::NotPayable(_) => "DOCUMENT_NOT_PAYABLE",
            Self::DocumentNotOpen(_) => "DOCUMENT_NOT_OPEN",
            Self::DirectionRequired => "PAYMENT_DIRECTION_REQUIRED",
            Self::PartyRequired => "PAYMENT_PARTY_REQUIRED",
            Self::InvalidChequeTransition { .. } => "INVALID_CHEQUE_TRANSITION",
        }
    }

    /// All payment errors are validation errors.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
