//! Flat document status labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a document.
///
/// One label set is shared by every kind; the subset a kind may use and
/// the transitions between labels live in [`crate::workflow::StatusMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Not yet committed to the books.
    Draft,
    /// Estimate sent to the customer.
    Sent,
    /// Open with nothing settled.
    Unpaid,
    /// Open with part of the amount settled.
    Partial,
    /// Open and past its due date.
    Overdue,
    /// Fully settled.
    Paid,
    /// Cancelled by the user.
    Cancelled,
    /// Goods returned; balance effect reversed.
    Returned,
    /// Estimate accepted by the customer.
    Accepted,
    /// Estimate rejected by the customer.
    Rejected,
    /// Estimate lapsed.
    Expired,
    /// Estimate converted into another document.
    Converted,
}

impl DocumentStatus {
    /// All status labels.
    pub const ALL: [Self; 12] = [
        Self::Draft,
        Self::Sent,
        Self::Unpaid,
        Self::Partial,
        Self::Overdue,
        Self::Paid,
        Self::Cancelled,
        Self::Returned,
        Self::Accepted,
        Self::Rejected,
        Self::Expired,
        Self::Converted,
    ];

    /// Returns the string stored in the `status` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::Converted => "converted",
        }
    }

    /// Parses a status from its column value.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    /// Returns true for states nothing may leave.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Returned | Self::Converted | Self::Rejected | Self::Expired
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
