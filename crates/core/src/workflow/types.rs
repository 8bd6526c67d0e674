//! Status transition results.

use serde::{Deserialize, Serialize};

use crate::document::DocumentStatus;

/// Why a status moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// Requested by the user.
    Manual,
    /// Driven by a payment being recorded or reversed.
    Payment,
    /// Driven by the overdue sweep.
    Sweep,
    /// Driven by converting the document.
    Conversion,
    /// Driven by an edit that changed the total.
    Revision,
}

/// A validated status change and the side effects it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Status before.
    pub from: DocumentStatus,
    /// Status after.
    pub to: DocumentStatus,
    /// What drove the change.
    pub cause: TransitionCause,
    /// The document's party balance effect must be reversed.
    pub reverse_balance: bool,
}
