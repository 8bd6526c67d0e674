//! Audit trail types and typed field diffs.
//!
//! History rows are append-only. An `updated` row carries the changed
//! fields only, each with its old and new value, serialized as JSON.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tallybook_shared::types::{DocumentId, PartyId, UserId};

use crate::document::{DocumentKind, DocumentStatus, KindDetails, LineItemInput};

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// Document committed.
    Created,
    /// Header or lines edited.
    Updated,
    /// Status moved.
    StatusChanged,
    /// Payment recorded against the document.
    PaymentRecorded,
    /// Payment removed or bounced.
    PaymentDeleted,
    /// Estimate converted into another document.
    Converted,
    /// Document removed.
    Deleted,
}

impl HistoryAction {
    /// Returns the string stored in the `action` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::PaymentRecorded => "payment_recorded",
            Self::PaymentDeleted => "payment_deleted",
            Self::Converted => "converted",
            Self::Deleted => "deleted",
        }
    }

    /// Parses an action from its column value.
    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::Created,
            Self::Updated,
            Self::StatusChanged,
            Self::PaymentRecorded,
            Self::PaymentDeleted,
            Self::Converted,
            Self::Deleted,
        ]
        .into_iter()
        .find(|a| a.as_str() == s)
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who performed an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User ID, absent for system actions.
    pub id: Option<UserId>,
    /// Display name.
    pub name: String,
}

impl Actor {
    /// A named user.
    #[must_use]
    pub fn user(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// A system actor with no user ID.
    #[must_use]
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// Document fields tracked by the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    /// Linked party.
    CounterpartyId,
    /// Party name printed on the document.
    CounterpartyName,
    /// Document date.
    Date,
    /// Due date, or validity date for estimates.
    DueDate,
    /// Supplier's bill number on purchases.
    SupplierReference,
    /// Invoice a credit note is issued against.
    AgainstInvoice,
    /// Credit note reason.
    Reason,
    /// Expense category.
    Category,
    /// Document-level discount as entered.
    DocumentDiscount,
    /// Sum of line bases.
    Subtotal,
    /// Sum of line taxes.
    TaxAmount,
    /// Line discounts plus the document discount.
    DiscountAmount,
    /// Document total.
    Total,
    /// Outstanding amount.
    AmountDue,
    /// Free-text notes.
    Notes,
    /// Printed terms.
    Terms,
    /// Line items in display order.
    Lines,
    /// Document status.
    Status,
    /// Document created from this one by conversion.
    ConvertedTo,
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Field not set.
    Null,
    /// Free text.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Monetary amount.
    Money(Decimal),
    /// Line items as entered.
    Lines(Vec<LineItemInput>),
    /// Document status.
    Status(DocumentStatus),
    /// Party reference.
    Party(PartyId),
    /// Document reference.
    Document(DocumentId),
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Money(value)
    }
}

impl From<DocumentStatus> for FieldValue {
    fn from(value: DocumentStatus) -> Self {
        Self::Status(value)
    }
}

impl From<PartyId> for FieldValue {
    fn from(value: PartyId) -> Self {
        Self::Party(value)
    }
}

impl From<DocumentId> for FieldValue {
    fn from(value: DocumentId) -> Self {
        Self::Document(value)
    }
}

/// Old and new value of one changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// The field.
    pub field: DocumentField,
    /// Value before.
    pub old: FieldValue,
    /// Value after.
    pub new: FieldValue,
}

impl FieldChange {
    /// A status change.
    #[must_use]
    pub fn status(from: DocumentStatus, to: DocumentStatus) -> Self {
        Self {
            field: DocumentField::Status,
            old: from.into(),
            new: to.into(),
        }
    }
}

/// Diff-relevant state of a document at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// Linked party.
    pub counterparty_id: Option<PartyId>,
    /// Party name.
    pub counterparty_name: String,
    /// Document date.
    pub date: NaiveDate,
    /// Kind-specific fields.
    pub details: KindDetails,
    /// Document-level discount.
    pub document_discount: Decimal,
    /// Sum of line bases.
    pub subtotal: Decimal,
    /// Sum of line taxes.
    pub tax_amount: Decimal,
    /// Total discount.
    pub discount_amount: Decimal,
    /// Document total.
    pub total: Decimal,
    /// Outstanding amount.
    pub amount_due: Decimal,
    /// Notes.
    pub notes: Option<String>,
    /// Terms.
    pub terms: Option<String>,
    /// Lines in display order.
    pub lines: Vec<LineItemInput>,
    /// Current status.
    pub status: DocumentStatus,
}

impl DocumentSnapshot {
    fn values(&self) -> Vec<(DocumentField, FieldValue)> {
        let columns = self.details.columns();
        vec![
            (DocumentField::CounterpartyId, self.counterparty_id.into()),
            (DocumentField::CounterpartyName, self.counterparty_name.clone().into()),
            (DocumentField::Date, self.date.into()),
            (DocumentField::DueDate, columns.due_date.into()),
            (DocumentField::SupplierReference, columns.supplier_reference.into()),
            (DocumentField::AgainstInvoice, columns.against_invoice.into()),
            (DocumentField::Reason, columns.reason.into()),
            (DocumentField::Category, columns.category.into()),
            (DocumentField::DocumentDiscount, self.document_discount.into()),
            (DocumentField::Subtotal, self.subtotal.into()),
            (DocumentField::TaxAmount, self.tax_amount.into()),
            (DocumentField::DiscountAmount, self.discount_amount.into()),
            (DocumentField::Total, self.total.into()),
            (DocumentField::AmountDue, self.amount_due.into()),
            (DocumentField::Notes, self.notes.clone().into()),
            (DocumentField::Terms, self.terms.clone().into()),
            (DocumentField::Lines, FieldValue::Lines(self.lines.clone())),
            (DocumentField::Status, self.status.into()),
        ]
    }

    /// Fields that differ between `self` (old) and `new`.
    #[must_use]
    pub fn diff(&self, new: &Self) -> Vec<FieldChange> {
        self.values()
            .into_iter()
            .zip(new.values())
            .filter(|((_, old), (_, new))| old != new)
            .map(|((field, old), (_, new))| FieldChange { field, old, new })
            .collect()
    }
}

/// History description for a document lifecycle event.
#[must_use]
pub fn describe_document(action: HistoryAction, kind: DocumentKind, number: &str) -> String {
    let verb = match action {
        HistoryAction::Created => "created",
        HistoryAction::Updated => "updated",
        HistoryAction::Deleted => "deleted",
        HistoryAction::StatusChanged => "status changed",
        HistoryAction::PaymentRecorded => "payment recorded",
        HistoryAction::PaymentDeleted => "payment removed",
        HistoryAction::Converted => "converted",
    };
    format!("{} {number} {verb}", kind.label())
}

/// History description for a status change.
#[must_use]
pub fn describe_status(number: &str, from: DocumentStatus, to: DocumentStatus) -> String {
    format!("{number} moved from {from} to {to}")
}

/// History description for a payment event.
#[must_use]
pub fn describe_payment(action: HistoryAction, payment_number: &str, amount: Decimal) -> String {
    match action {
        HistoryAction::PaymentDeleted => format!("Payment {payment_number} of {amount} removed"),
        _ => format!("Payment {payment_number} of {amount} recorded"),
    }
}

/// History description for a conversion.
#[must_use]
pub fn describe_conversion(source_number: &str, target_kind: DocumentKind, target_number: &str) -> String {
    format!(
        "{source_number} converted to {} {target_number}",
        target_kind.label().to_lowercase()
    )
}
