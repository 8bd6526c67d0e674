//! Counterparty balance rules.
//!
//! A party's `current_balance` is positive when the party owes the shop
//! (receivable) and negative when the shop owes the party (payable). The
//! balance is only ever moved by the deltas below and never recomputed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the balance a document or payment moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSide {
    /// The counterparty owes us.
    Receivable,
    /// We owe the counterparty.
    Payable,
    /// No balance effect.
    Neutral,
}

/// An event that moves a party balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BalanceEvent {
    /// Document committed.
    Created {
        /// Document total.
        total: Decimal,
    },
    /// Document deleted.
    Deleted {
        /// Document total.
        total: Decimal,
    },
    /// Payment recorded.
    PaymentRecorded {
        /// Payment amount.
        amount: Decimal,
    },
    /// Payment deleted or bounced.
    PaymentDeleted {
        /// Payment amount.
        amount: Decimal,
    },
    /// Document returned.
    Returned {
        /// Document total.
        total: Decimal,
    },
    /// Total changed by an update that opted into rebalancing.
    TotalRevised {
        /// Total before the update.
        old: Decimal,
        /// Total after the update.
        new: Decimal,
    },
}

impl BalanceSide {
    /// Signed change the event applies to a party on this side.
    #[must_use]
    pub fn delta(self, event: BalanceEvent) -> Decimal {
        let receivable = match event {
            BalanceEvent::Created { total } => total,
            BalanceEvent::Deleted { total } | BalanceEvent::Returned { total } => -total,
            BalanceEvent::PaymentRecorded { amount } => -amount,
            BalanceEvent::PaymentDeleted { amount } => amount,
            BalanceEvent::TotalRevised { old, new } => new - old,
        };

        match self {
            Self::Receivable => receivable,
            Self::Payable => -receivable,
            Self::Neutral => Decimal::ZERO,
        }
    }
}

/// A pending balance change for one party.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceAdjustment<P> {
    /// Party to adjust.
    pub party_id: P,
    /// Signed delta.
    pub delta: Decimal,
}

impl<P> BalanceAdjustment<P> {
    /// Builds the adjustment for an event, or `None` when it is a no-op.
    pub fn for_event(party_id: P, side: BalanceSide, event: BalanceEvent) -> Option<Self> {
        let delta = side.delta(event);
        (!delta.is_zero()).then_some(Self { party_id, delta })
    }
}

/// Balance produced by replaying a series of events from zero.
#[must_use]
pub fn replay(side: BalanceSide, events: &[BalanceEvent]) -> Decimal {
    events.iter().map(|e| side.delta(*e)).sum()
}
