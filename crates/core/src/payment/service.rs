//! Payment preconditions.

use rust_decimal::Decimal;

use crate::document::{DocumentKind, DocumentStatus};
use crate::payment::error::PaymentError;
use crate::payment::types::PaymentDirection;

/// Stateless payment rules.
pub struct PaymentService;

impl PaymentService {
    /// Rejects zero and negative amounts.
    pub fn validate_amount(amount: Decimal) -> Result<(), PaymentError> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount(amount));
        }
        Ok(())
    }

    /// Checks a linked document can take a payment and returns its direction.
    ///
    /// Estimates, drafts and closed documents are refused. Paid documents
    /// still accept payments so overpayments can be recorded.
    pub fn direction_for_document(
        kind: DocumentKind,
        status: DocumentStatus,
    ) -> Result<PaymentDirection, PaymentError> {
        if !kind.accepts_payments() {
            return Err(PaymentError::NotPayable(kind));
        }
        if status == DocumentStatus::Draft || status.is_terminal() {
            return Err(PaymentError::DocumentNotOpen(status));
        }
        PaymentDirection::for_side(kind.balance_side()).ok_or(PaymentError::NotPayable(kind))
    }
}
