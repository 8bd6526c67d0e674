//! Payment types and settlement arithmetic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tallybook_shared::types::{BankAccountId, DocumentId, PartyId, PaymentId};

use crate::cashbank::{LedgerAccount, MovementType};
use crate::party::BalanceSide;
use crate::sequence::SequenceKind;

/// Direction of money relative to the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// Money received.
    In,
    /// Money paid out.
    Out,
}

impl PaymentDirection {
    /// Returns the string stored in the `direction` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Parses a direction from its column value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            _ => None,
        }
    }

    /// Direction that settles a document on `side`.
    #[must_use]
    pub fn for_side(side: BalanceSide) -> Option<Self> {
        match side {
            BalanceSide::Receivable => Some(Self::In),
            BalanceSide::Payable => Some(Self::Out),
            BalanceSide::Neutral => None,
        }
    }

    /// Balance side used for the party adjustment.
    #[must_use]
    pub fn balance_side(&self) -> BalanceSide {
        match self {
            Self::In => BalanceSide::Receivable,
            Self::Out => BalanceSide::Payable,
        }
    }

    /// Counter the payment number is drawn from.
    #[must_use]
    pub fn sequence(&self) -> SequenceKind {
        match self {
            Self::In => SequenceKind::PaymentIn,
            Self::Out => SequenceKind::PaymentOut,
        }
    }

    /// Signed ledger amount for a payment of `amount`.
    #[must_use]
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Self::In => amount,
            Self::Out => -amount,
        }
    }

    /// Ledger entry type for a payment settled through `account`.
    #[must_use]
    pub fn movement(&self, account: LedgerAccount) -> MovementType {
        MovementType::for_payment(account, matches!(self, Self::In))
    }
}

impl fmt::Display for PaymentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a payment is settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaymentMode {
    /// Cash drawer.
    Cash,
    /// Bank transfer on a named account.
    Bank {
        /// Account the money moves through.
        account_id: BankAccountId,
    },
    /// Paper cheque; no ledger effect until it clears.
    Cheque {
        /// Number printed on the cheque.
        cheque_number: String,
        /// Deposit or drawing account; the cash drawer when absent.
        account_id: Option<BankAccountId>,
    },
}

impl PaymentMode {
    /// Returns the string stored in the `mode` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank { .. } => "bank",
            Self::Cheque { .. } => "cheque",
        }
    }

    /// Bank account stored on the payment row.
    #[must_use]
    pub fn bank_account_id(&self) -> Option<BankAccountId> {
        match self {
            Self::Cash => None,
            Self::Bank { account_id } => Some(*account_id),
            Self::Cheque { account_id, .. } => *account_id,
        }
    }

    /// Account hit immediately when the payment is recorded.
    ///
    /// Cheques return `None`; their entry is appended on clearing.
    #[must_use]
    pub fn immediate_account(&self) -> Option<LedgerAccount> {
        match self {
            Self::Cash => Some(LedgerAccount::Cash),
            Self::Bank { account_id } => Some(LedgerAccount::Bank(*account_id)),
            Self::Cheque { .. } => None,
        }
    }
}

/// A request to record a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Caller-issued payment ID.
    pub payment_id: PaymentId,
    /// Settled document, if any.
    pub document_id: Option<DocumentId>,
    /// Paying or paid party; taken from the document when linked.
    pub party_id: Option<PartyId>,
    /// Required for unlinked payments, derived otherwise.
    pub direction: Option<PaymentDirection>,
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Settlement mode.
    pub mode: PaymentMode,
    /// Free-text reference.
    pub reference: Option<String>,
    /// Payment date.
    pub date: NaiveDate,
}

impl PaymentInput {
    /// A cash payment against a document.
    #[must_use]
    pub fn cash(document_id: DocumentId, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            payment_id: PaymentId::new(),
            document_id: Some(document_id),
            party_id: None,
            direction: None,
            amount,
            mode: PaymentMode::Cash,
            reference: None,
            date,
        }
    }
}

/// Document amounts after a payment is applied or reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// New `amount_paid`.
    pub amount_paid: Decimal,
    /// New `amount_due`.
    pub amount_due: Decimal,
}

impl Settlement {
    /// Applies a payment of `amount`.
    #[must_use]
    pub fn apply(total: Decimal, amount_paid: Decimal, amount: Decimal) -> Self {
        let amount_paid = amount_paid + amount;
        Self {
            amount_paid,
            amount_due: total - amount_paid,
        }
    }

    /// Reverses a payment of `amount`.
    #[must_use]
    pub fn reverse(total: Decimal, amount_paid: Decimal, amount: Decimal) -> Self {
        Self::apply(total, amount_paid, -amount)
    }

    /// Returns true when nothing is left to pay.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.amount_due <= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_settlement() {
        let s = Settlement::apply(dec!(500), Decimal::ZERO, dec!(200));
        assert_eq!(s.amount_paid, dec!(200));
        assert_eq!(s.amount_due, dec!(300));
        assert!(!s.is_settled());
    }

    #[test]
    fn test_overpayment_is_settled() {
        let s = Settlement::apply(dec!(500), dec!(300), dec!(250));
        assert_eq!(s.amount_due, dec!(-50));
        assert!(s.is_settled());
    }

    #[test]
    fn test_reverse_restores() {
        let s = Settlement::apply(dec!(500), dec!(0), dec!(500));
        let r = Settlement::reverse(dec!(500), s.amount_paid, dec!(500));
        assert_eq!(r.amount_paid, Decimal::ZERO);
        assert_eq!(r.amount_due, dec!(500));
    }

    #[test]
    fn test_direction_from_side() {
        assert_eq!(
            PaymentDirection::for_side(BalanceSide::Receivable),
            Some(PaymentDirection::In)
        );
        assert_eq!(
            PaymentDirection::for_side(BalanceSide::Payable),
            Some(PaymentDirection::Out)
        );
        assert_eq!(PaymentDirection::for_side(BalanceSide::Neutral), None);
    }

    #[test]
    fn test_direction_sign_and_sequence() {
        assert_eq!(PaymentDirection::Out.signed(dec!(20)), dec!(-20));
        assert_eq!(PaymentDirection::In.sequence().default_prefix(), "REC");
        assert_eq!(PaymentDirection::Out.sequence().default_prefix(), "PAY");
    }

    #[test]
    fn test_cheque_has_no_immediate_account() {
        let mode = PaymentMode::Cheque {
            cheque_number: "004512".to_string(),
            account_id: Some(BankAccountId::new()),
        };
        assert_eq!(mode.immediate_account(), None);
        assert!(mode.bank_account_id().is_some());
        assert_eq!(mode.as_str(), "cheque");
    }
}
