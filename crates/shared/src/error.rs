//! Error taxonomy shared by every engine error.
//!
//! Domain crates define their own `thiserror` enums; each of them maps onto
//! one [`ErrorKind`] so callers can decide how to surface a failure without
//! matching every variant.

use serde::Serialize;

/// Broad classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// User input rejected before anything was persisted (stock, expiry, dates).
    Validation,
    /// A referenced row is missing or inconsistent; indicates a caller-side bug.
    Integrity,
    /// The underlying store failed or refused the transaction.
    Transaction,
}

impl ErrorKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Integrity => "integrity",
            Self::Transaction => "transaction",
        }
    }

    /// Returns true if the message should be shown to the user verbatim.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
