//! Document input types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{DocumentId, PartyId, ProductId};

use crate::document::kind::DocumentKind;

/// Kind-specific document fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindDetails {
    /// Sale invoice fields.
    SaleInvoice {
        /// Payment due date.
        due_date: Option<NaiveDate>,
    },
    /// Purchase invoice fields.
    PurchaseInvoice {
        /// Payment due date.
        due_date: Option<NaiveDate>,
        /// The supplier's own bill number.
        supplier_reference: Option<String>,
    },
    /// Estimate fields.
    Estimate {
        /// Last day the quotation holds.
        valid_until: Option<NaiveDate>,
    },
    /// Credit note fields.
    CreditNote {
        /// Invoice the credit is issued against.
        against_invoice: Option<DocumentId>,
        /// Free-text reason.
        reason: Option<String>,
    },
    /// Expense fields.
    Expense {
        /// Expense category (rent, fuel, ...).
        category: String,
    },
}

impl KindDetails {
    /// Returns the document kind these details belong to.
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::SaleInvoice { .. } => DocumentKind::SaleInvoice,
            Self::PurchaseInvoice { .. } => DocumentKind::PurchaseInvoice,
            Self::Estimate { .. } => DocumentKind::Estimate,
            Self::CreditNote { .. } => DocumentKind::CreditNote,
            Self::Expense { .. } => DocumentKind::Expense,
        }
    }

    /// The date stored in the header's `due_date` column.
    ///
    /// For estimates this is the validity date.
    #[must_use]
    pub fn due_date(&self) -> Option<NaiveDate> {
        match self {
            Self::SaleInvoice { due_date } | Self::PurchaseInvoice { due_date, .. } => *due_date,
            Self::Estimate { valid_until } => *valid_until,
            Self::CreditNote { .. } | Self::Expense { .. } => None,
        }
    }

    /// Returns a copy with the due date replaced, where the kind has one.
    #[must_use]
    pub fn with_due_date(self, date: Option<NaiveDate>) -> Self {
        match self {
            Self::SaleInvoice { .. } => Self::SaleInvoice { due_date: date },
            Self::PurchaseInvoice {
                supplier_reference, ..
            } => Self::PurchaseInvoice {
                due_date: date,
                supplier_reference,
            },
            Self::Estimate { .. } => Self::Estimate { valid_until: date },
            other => other,
        }
    }

    /// Flattens the details into nullable header columns.
    #[must_use]
    pub fn columns(&self) -> DetailColumns {
        let mut columns = DetailColumns {
            due_date: self.due_date(),
            ..DetailColumns::default()
        };
        match self {
            Self::PurchaseInvoice {
                supplier_reference, ..
            } => columns.supplier_reference.clone_from(supplier_reference),
            Self::CreditNote {
                against_invoice,
                reason,
            } => {
                columns.against_invoice = *against_invoice;
                columns.reason.clone_from(reason);
            }
            Self::Expense { category } => columns.category = Some(category.clone()),
            Self::SaleInvoice { .. } | Self::Estimate { .. } => {}
        }
        columns
    }

    /// Rebuilds details from stored header columns.
    #[must_use]
    pub fn from_columns(kind: DocumentKind, columns: DetailColumns) -> Self {
        match kind {
            DocumentKind::SaleInvoice => Self::SaleInvoice {
                due_date: columns.due_date,
            },
            DocumentKind::PurchaseInvoice => Self::PurchaseInvoice {
                due_date: columns.due_date,
                supplier_reference: columns.supplier_reference,
            },
            DocumentKind::Estimate => Self::Estimate {
                valid_until: columns.due_date,
            },
            DocumentKind::CreditNote => Self::CreditNote {
                against_invoice: columns.against_invoice,
                reason: columns.reason,
            },
            DocumentKind::Expense => Self::Expense {
                category: columns.category.unwrap_or_default(),
            },
        }
    }
}

/// Nullable header columns backing [`KindDetails`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailColumns {
    /// Due date or estimate validity.
    pub due_date: Option<NaiveDate>,
    /// Supplier bill number.
    pub supplier_reference: Option<String>,
    /// Credited invoice.
    pub against_invoice: Option<DocumentId>,
    /// Credit note reason.
    pub reason: Option<String>,
    /// Expense category.
    pub category: Option<String>,
}

/// One line of a document as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Linked product; lines without one are free text and stock-exempt.
    pub product_id: Option<ProductId>,
    /// Name snapshot printed on the document.
    pub name: String,
    /// Quantity, must be positive.
    pub quantity: Decimal,
    /// Unit of measure.
    pub unit: String,
    /// Price per unit, must not be negative.
    pub unit_price: Decimal,
    /// Line discount in percent (0..=100).
    pub discount_percent: Decimal,
    /// Tax rate in percent (0..=100).
    pub tax_percent: Decimal,
}

impl LineItemInput {
    /// Creates a plain line with no discount or tax.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_id: None,
            name: name.into(),
            quantity,
            unit: "pcs".to_string(),
            unit_price,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
        }
    }

    /// Links the line to a product.
    #[must_use]
    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Sets the discount and tax percentages.
    #[must_use]
    pub fn with_rates(mut self, discount_percent: Decimal, tax_percent: Decimal) -> Self {
        self.discount_percent = discount_percent;
        self.tax_percent = tax_percent;
        self
    }
}

/// Everything the caller supplies to create or update a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Kind plus kind-specific fields.
    pub details: KindDetails,
    /// Counterparty whose balance the document moves.
    pub counterparty_id: Option<PartyId>,
    /// Counterparty name snapshot.
    pub counterparty_name: String,
    /// Document date.
    pub date: NaiveDate,
    /// Line items, at least one.
    pub lines: Vec<LineItemInput>,
    /// Flat discount on the whole document.
    pub document_discount: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Free-text terms.
    pub terms: Option<String>,
}

impl DocumentInput {
    /// Returns the kind of the document.
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.details.kind()
    }
}
