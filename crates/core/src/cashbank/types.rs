//! Cash and bank account types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tallybook_shared::types::BankAccountId;

use crate::cashbank::error::CashBankError;

/// An account with a running-balance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum LedgerAccount {
    /// The implicit cash drawer.
    Cash,
    /// A named bank account.
    Bank(BankAccountId),
}

impl LedgerAccount {
    /// Builds an account from the nullable `account_id` column.
    #[must_use]
    pub fn from_column(account_id: Option<BankAccountId>) -> Self {
        account_id.map_or(Self::Cash, Self::Bank)
    }

    /// Value stored in the nullable `account_id` column.
    #[must_use]
    pub fn bank_id(&self) -> Option<BankAccountId> {
        match self {
            Self::Cash => None,
            Self::Bank(id) => Some(*id),
        }
    }
}

impl fmt::Display for LedgerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Bank(id) => write!(f, "bank:{id}"),
        }
    }
}

/// Type of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Money into the cash drawer.
    CashIn,
    /// Money out of the cash drawer.
    CashOut,
    /// Correction on either kind of account; sign given by the caller.
    Adjustment,
    /// Money into a bank account.
    Deposit,
    /// Money out of a bank account.
    Withdrawal,
    /// One leg of an internal transfer.
    Transfer,
}

impl MovementType {
    /// Returns the string stored in the `entry_type` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashIn => "cash_in",
            Self::CashOut => "cash_out",
            Self::Adjustment => "adjustment",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
        }
    }

    /// Entry type used when a payment settles through `account`.
    #[must_use]
    pub fn for_payment(account: LedgerAccount, inflow: bool) -> Self {
        match (account, inflow) {
            (LedgerAccount::Cash, true) => Self::CashIn,
            (LedgerAccount::Cash, false) => Self::CashOut,
            (LedgerAccount::Bank(_), true) => Self::Deposit,
            (LedgerAccount::Bank(_), false) => Self::Withdrawal,
        }
    }

    /// Converts a user-entered amount into the signed ledger amount.
    ///
    /// In/out movements take a positive amount and pick the sign
    /// themselves; adjustments take a non-zero signed amount as is.
    /// Transfers are only created through the transfer operation.
    pub fn signed_amount(
        self,
        account: LedgerAccount,
        amount: Decimal,
    ) -> Result<Decimal, CashBankError> {
        let allowed = match self {
            Self::CashIn | Self::CashOut => matches!(account, LedgerAccount::Cash),
            Self::Deposit | Self::Withdrawal => matches!(account, LedgerAccount::Bank(_)),
            Self::Adjustment => true,
            Self::Transfer => false,
        };
        if !allowed {
            return Err(CashBankError::MovementNotAllowed {
                movement: self,
                account,
            });
        }

        match self {
            Self::Adjustment if amount.is_zero() => Err(CashBankError::NonPositiveAmount(amount)),
            Self::Adjustment => Ok(amount),
            _ if amount <= Decimal::ZERO => Err(CashBankError::NonPositiveAmount(amount)),
            Self::CashIn | Self::Deposit => Ok(amount),
            _ => Ok(-amount),
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
