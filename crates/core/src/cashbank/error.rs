//! Cash and bank ledger errors.

use rust_decimal::Decimal;
use tallybook_shared::ErrorKind;
use thiserror::Error;

use crate::cashbank::types::{LedgerAccount, MovementType};

/// Errors raised by manual cash and bank movements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CashBankError {
    /// Amount must be positive (non-zero for adjustments).
    #[error("Invalid movement amount: {0}")]
    NonPositiveAmount(Decimal),

    /// Movement type cannot be used on this account.
    #[error("Movement {movement} is not allowed on {account}")]
    MovementNotAllowed {
        /// Requested movement.
        movement: MovementType,
        /// Target account.
        account: LedgerAccount,
    },

    /// Source and destination of a transfer are the same.
    #[error("Cannot transfer from {0} to itself")]
    SameAccountTransfer(LedgerAccount),

    /// Bank account name is blank.
    #[error("Bank account name is required")]
    BankAccountNameRequired,
}

impl CashBankError {
    /// Returns the error code for display layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "INVALID_AMOUNT",
            Self::MovementNotAllowed { .. } => "MOVEMENT_NOT_ALLOWED",
            Self::SameAccountTransfer(_) => "SAME_ACCOUNT_TRANSFER",
            Self::BankAccountNameRequired => "BANK_ACCOUNT_NAME_REQUIRED",
        }
    }

    /// All cash/bank errors are validation errors.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
