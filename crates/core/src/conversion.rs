//! Document conversion routes.
//!
//! Conversion copies a source document into a fresh document of another
//! kind. The source keeps its totals, stock and balance untouched and is
//! closed as `converted`.

use chrono::NaiveDate;
use tallybook_shared::ErrorKind;
use thiserror::Error;

use crate::document::{DocumentInput, DocumentKind, DocumentStatus, KindDetails};
use crate::workflow::{StatusError, StatusMachine};

/// A supported source → target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRoute {
    /// Kind of the source document.
    pub from: DocumentKind,
    /// Kind of the created document.
    pub to: DocumentKind,
}

/// Supported routes.
pub const ROUTES: &[ConversionRoute] = &[ConversionRoute {
    from: DocumentKind::Estimate,
    to: DocumentKind::SaleInvoice,
}];

/// Errors raised while converting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// No route between the two kinds.
    #[error("Cannot convert a {from} into a {to}")]
    UnsupportedRoute {
        /// Source kind.
        from: DocumentKind,
        /// Target kind.
        to: DocumentKind,
    },

    /// The source is not in an open state.
    #[error("Document in status {0} cannot be converted")]
    SourceNotOpen(DocumentStatus),
}

impl ConversionError {
    /// Returns the error code for display layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedRoute { .. } => "UNSUPPORTED_CONVERSION",
            Self::SourceNotOpen(_) => "SOURCE_NOT_CONVERTIBLE",
        }
    }

    /// All conversion errors are validation errors.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Stateless conversion rules.
pub struct ConversionService;

impl ConversionService {
    /// Looks up the route between two kinds.
    pub fn route(from: DocumentKind, to: DocumentKind) -> Result<ConversionRoute, ConversionError> {
        ROUTES
            .iter()
            .copied()
            .find(|r| r.from == from && r.to == to)
            .ok_or(ConversionError::UnsupportedRoute { from, to })
    }

    /// Checks the source status allows conversion.
    pub fn check_source(kind: DocumentKind, status: DocumentStatus) -> Result<(), ConversionError> {
        StatusMachine::validate_conversion(kind, status)
            .map(|_| ())
            .map_err(|e| match e {
                StatusError::InvalidTransition { from, .. } => ConversionError::SourceNotOpen(from),
                _ => ConversionError::SourceNotOpen(status),
            })
    }

    /// Builds the target document request from the source.
    ///
    /// Counterparty, lines, discount, notes and terms are copied verbatim.
    /// The document date becomes `date` and the target's due date
    /// `due_date`.
    #[must_use]
    pub fn target_input(
        route: ConversionRoute,
        source: &DocumentInput,
        date: NaiveDate,
        due_date: Option<NaiveDate>,
    ) -> DocumentInput {
        let details = match route.to {
            DocumentKind::SaleInvoice => KindDetails::SaleInvoice { due_date },
            DocumentKind::PurchaseInvoice => KindDetails::PurchaseInvoice {
                due_date,
                supplier_reference: None,
            },
            DocumentKind::Estimate => KindDetails::Estimate {
                valid_until: due_date,
            },
            DocumentKind::CreditNote => KindDetails::CreditNote {
                against_invoice: None,
                reason: None,
            },
            DocumentKind::Expense => KindDetails::Expense {
                category: String::new(),
            },
        };

        DocumentInput {
            details,
            counterparty_id: source.counterparty_id,
            counterparty_name: source.counterparty_name.clone(),
            date,
            lines: source.lines.clone(),
            document_discount: source.document_discount,
            notes: source.notes.clone(),
            terms: source.terms.clone(),
        }
    }
}
