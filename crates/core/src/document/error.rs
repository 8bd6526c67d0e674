//! Document validation errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tallybook_shared::ErrorKind;
use thiserror::Error;

use crate::document::kind::DocumentKind;

/// Errors raised while validating a document before any write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A document needs at least one line.
    #[error("Document must have at least one line item")]
    NoLines,

    /// Line name is blank.
    #[error("Line {line} has no name")]
    EmptyLineName {
        /// Zero-based line index.
        line: usize,
    },

    /// Quantity is zero or negative.
    #[error("Line {line}: quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// Zero-based line index.
        line: usize,
        /// The offending quantity.
        quantity: Decimal,
    },

    /// Unit price is negative.
    #[error("Line {line}: unit price cannot be negative, got {unit_price}")]
    NegativeUnitPrice {
        /// Zero-based line index.
        line: usize,
        /// The offending price.
        unit_price: Decimal,
    },

    /// A discount or tax percentage is outside 0..=100.
    #[error("Line {line}: {field} must be between 0 and 100, got {value}")]
    PercentOutOfRange {
        /// Zero-based line index.
        line: usize,
        /// `discount_percent` or `tax_percent`.
        field: &'static str,
        /// The offending value.
        value: Decimal,
    },

    /// A line amount does not fit in a decimal.
    #[error("Line {line}: amount is too large")]
    LineAmountOverflow {
        /// Zero-based line index.
        line: usize,
    },

    /// The document totals do not fit in a decimal.
    #[error("Document total is too large")]
    TotalOverflow,

    /// Document-level discount is negative.
    #[error("Document discount cannot be negative, got {0}")]
    NegativeDocumentDiscount(Decimal),

    /// Document-level discount would make the total negative.
    #[error("Discount {discount} exceeds the document amount {available}")]
    DiscountExceedsTotal {
        /// Requested document discount.
        discount: Decimal,
        /// Amount left after line discounts and tax.
        available: Decimal,
    },

    /// Due date lies before the document date.
    #[error("Due date {due_date} is before document date {date}")]
    DueDateBeforeDocumentDate {
        /// Document date.
        date: NaiveDate,
        /// Due date.
        due_date: NaiveDate,
    },

    /// Expenses need a category.
    #[error("Expense category is required")]
    ExpenseCategoryRequired,

    /// An update tried to change the document kind.
    #[error("Cannot change document kind from {existing} to {requested}")]
    KindMismatch {
        /// Stored kind.
        existing: DocumentKind,
        /// Kind in the request.
        requested: DocumentKind,
    },
}

impl DocumentError {
    /// Returns the error code for display layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINE_ITEMS",
            Self::EmptyLineName { .. } => "EMPTY_LINE_NAME",
            Self::NonPositiveQuantity { .. } => "INVALID_QUANTITY",
            Self::NegativeUnitPrice { .. } => "INVALID_UNIT_PRICE",
            Self::PercentOutOfRange { .. } => "PERCENT_OUT_OF_RANGE",
            Self::LineAmountOverflow { .. } | Self::TotalOverflow => "AMOUNT_OVERFLOW",
            Self::NegativeDocumentDiscount(_) => "INVALID_DOCUMENT_DISCOUNT",
            Self::DiscountExceedsTotal { .. } => "DISCOUNT_EXCEEDS_TOTAL",
            Self::DueDateBeforeDocumentDate { .. } => "DUE_DATE_BEFORE_DATE",
            Self::ExpenseCategoryRequired => "EXPENSE_CATEGORY_REQUIRED",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
        }
    }

    /// Every document error is a validation error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
