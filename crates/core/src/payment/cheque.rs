//! Cheque lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payment::error::PaymentError;

/// Status of a cheque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeStatus {
    /// Received or issued, not yet through the bank.
    Pending,
    /// Honoured; the ledger entry exists.
    Cleared,
    /// Dishonoured; the payment has been reversed.
    Bounced,
}

impl ChequeStatus {
    /// Returns the string stored in the `status` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cleared => "cleared",
            Self::Bounced => "bounced",
        }
    }

    /// Parses a status from its column value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "cleared" => Some(Self::Cleared),
            "bounced" => Some(Self::Bounced),
            _ => None,
        }
    }

    /// Validates a transition. Only pending cheques can move.
    pub fn transition(self, to: Self) -> Result<Self, PaymentError> {
        match (self, to) {
            (Self::Pending, Self::Cleared | Self::Bounced) => Ok(to),
            _ => Err(PaymentError::InvalidChequeTransition { from: self, to }),
        }
    }
}

impl fmt::Display for ChequeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
