//! Engine error type.
//!
//! Aggregates the per-domain errors of `tallybook-core` with integrity
//! failures found while reading rows and store errors from `SeaORM`.

use sea_orm::DbErr;
use tallybook_core::cashbank::CashBankError;
use tallybook_core::conversion::ConversionError;
use tallybook_core::document::DocumentError;
use tallybook_core::payment::PaymentError;
use tallybook_core::stock::StockError;
use tallybook_core::workflow::StatusError;
use tallybook_shared::ErrorKind;
use tallybook_shared::types::{
    BankAccountId, ChequeId, DocumentId, LedgerEntryId, PartyId, PaymentId, ProductId,
};
use thiserror::Error;

/// Errors returned by engine operations.
///
/// Any error aborts the enclosing transaction; nothing is persisted.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid document request.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Stock check failed.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Status transition refused.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Payment refused.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Conversion refused.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Cash or bank movement refused.
    #[error(transparent)]
    CashBank(#[from] CashBankError),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Party not found.
    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Cheque not found.
    #[error("Cheque not found: {0}")]
    ChequeNotFound(ChequeId),

    /// Bank account not found.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(BankAccountId),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    LedgerEntryNotFound(LedgerEntryId),

    /// A stored value could not be decoded.
    #[error("Invalid value {value:?} in {table}.{column}")]
    CorruptRow {
        /// Table name.
        table: &'static str,
        /// Column name.
        column: &'static str,
        /// Raw value.
        value: String,
    },

    /// A sequence counter could not be seeded.
    #[error("Sequence counter {0} could not be seeded")]
    UnseedableCounter(String),

    /// History payload could not be encoded or decoded.
    #[error("History payload error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns the error code for display layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Document(e) => e.error_code(),
            Self::Stock(e) => e.error_code(),
            Self::Status(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::Conversion(e) => e.error_code(),
            Self::CashBank(e) => e.error_code(),
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::ChequeNotFound(_) => "CHEQUE_NOT_FOUND",
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::LedgerEntryNotFound(_) => "LEDGER_ENTRY_NOT_FOUND",
            Self::CorruptRow { .. } => "CORRUPT_ROW",
            Self::UnseedableCounter(_) => "UNSEEDABLE_COUNTER",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Document(e) => e.kind(),
            Self::Stock(e) => e.kind(),
            Self::Status(e) => e.kind(),
            Self::Payment(e) => e.kind(),
            Self::Conversion(e) => e.kind(),
            Self::CashBank(e) => e.kind(),
            Self::DocumentNotFound(_)
            | Self::PartyNotFound(_)
            | Self::ProductNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::ChequeNotFound(_)
            | Self::BankAccountNotFound(_)
            | Self::LedgerEntryNotFound(_)
            | Self::CorruptRow { .. }
            | Self::UnseedableCounter(_)
            | Self::Serialization(_) => ErrorKind::Integrity,
            Self::Database(_) => ErrorKind::Transaction,
        }
    }

    /// Returns true if re-issuing the whole operation may succeed.
    ///
    /// The engine never retries on its own; a partial retry could consume
    /// a sequence number twice.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(e) => {
                let message = e.to_string().to_lowercase();
                message.contains("database is locked") || message.contains("busy")
            }
            _ => false,
        }
    }

    pub(crate) fn corrupt(table: &'static str, column: &'static str, value: &str) -> Self {
        Self::CorruptRow {
            table,
            column,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classification() {
        let stock: EngineError = StockError::InsufficientStock {
            product_id: ProductId::new(),
            product: "Rice".to_string(),
            available: dec!(2),
            requested: dec!(5),
        }
        .into();
        assert_eq!(stock.kind(), ErrorKind::Validation);
        assert_eq!(stock.error_code(), "INSUFFICIENT_STOCK");
        assert!(!stock.is_retryable());

        let missing = EngineError::DocumentNotFound(DocumentId::new());
        assert_eq!(missing.kind(), ErrorKind::Integrity);

        let db = EngineError::Database(DbErr::Custom("boom".to_string()));
        assert_eq!(db.kind(), ErrorKind::Transaction);
        assert!(!db.is_retryable());
    }

    #[test]
    fn test_busy_errors_are_retryable() {
        let locked = EngineError::Database(DbErr::Custom(
            "error returned from database: (code: 5) database is locked".to_string(),
        ));
        assert!(locked.is_retryable());
    }

    #[test]
    fn test_domain_message_passes_through() {
        let err: EngineError = DocumentError::NoLines.into();
        assert_eq!(err.to_string(), "Document must have at least one line item");
    }
}
