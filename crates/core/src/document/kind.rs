//! Document kinds and their shared behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::status::DocumentStatus;
use crate::party::BalanceSide;
use crate::sequence::SequenceKind;
use crate::stock::StockDirection;

/// The kinds of financial document the engine manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Sale to a customer.
    SaleInvoice,
    /// Purchase from a supplier.
    PurchaseInvoice,
    /// Quotation that may later be converted.
    Estimate,
    /// Credit note issued to a customer.
    CreditNote,
    /// Business expense.
    Expense,
}

impl DocumentKind {
    /// All document kinds.
    pub const ALL: [Self; 5] = [
        Self::SaleInvoice,
        Self::PurchaseInvoice,
        Self::Estimate,
        Self::CreditNote,
        Self::Expense,
    ];

    /// Returns the string stored in the `kind` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleInvoice => "sale_invoice",
            Self::PurchaseInvoice => "purchase_invoice",
            Self::Estimate => "estimate",
            Self::CreditNote => "credit_note",
            Self::Expense => "expense",
        }
    }

    /// Parses a document kind from its column value.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Human label used in history descriptions.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SaleInvoice => "Sale invoice",
            Self::PurchaseInvoice => "Purchase invoice",
            Self::Estimate => "Estimate",
            Self::CreditNote => "Credit note",
            Self::Expense => "Expense",
        }
    }

    /// Counter the document number is drawn from.
    #[must_use]
    pub fn sequence(&self) -> SequenceKind {
        match self {
            Self::SaleInvoice => SequenceKind::SaleInvoice,
            Self::PurchaseInvoice => SequenceKind::PurchaseInvoice,
            Self::Estimate => SequenceKind::Estimate,
            Self::CreditNote => SequenceKind::CreditNote,
            Self::Expense => SequenceKind::Expense,
        }
    }

    /// Which side of the counterparty balance the document moves.
    #[must_use]
    pub fn balance_side(&self) -> BalanceSide {
        match self {
            Self::SaleInvoice => BalanceSide::Receivable,
            Self::PurchaseInvoice | Self::CreditNote | Self::Expense => BalanceSide::Payable,
            Self::Estimate => BalanceSide::Neutral,
        }
    }

    /// Stock movement applied by the document, if any.
    #[must_use]
    pub fn stock_direction(&self) -> Option<StockDirection> {
        match self {
            Self::SaleInvoice => Some(StockDirection::Outbound),
            Self::PurchaseInvoice => Some(StockDirection::Inbound),
            Self::Estimate | Self::CreditNote | Self::Expense => None,
        }
    }

    /// Returns true if payments can be recorded against the document.
    #[must_use]
    pub fn accepts_payments(&self) -> bool {
        !matches!(self, Self::Estimate)
    }

    /// Returns true for sale and purchase invoices.
    #[must_use]
    pub fn is_invoice(&self) -> bool {
        matches!(self, Self::SaleInvoice | Self::PurchaseInvoice)
    }

    /// Status a committed (non-draft) document starts in.
    #[must_use]
    pub fn open_status(&self) -> DocumentStatus {
        match self {
            Self::Estimate => DocumentStatus::Sent,
            Self::SaleInvoice | Self::PurchaseInvoice | Self::CreditNote | Self::Expense => {
                DocumentStatus::Unpaid
            }
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
