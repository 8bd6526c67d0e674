//! Running-balance chain audit.
//!
//! Removing an entry does not rewrite the running balances stored after it,
//! so a chain can carry a break. `verify_chain` finds the first one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::LedgerEntryId;

/// The fields of a stored entry the audit needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    /// Entry ID.
    pub entry_id: LedgerEntryId,
    /// Per-account creation counter.
    pub account_version: i64,
    /// Signed amount.
    pub amount: Decimal,
    /// Stored running balance.
    pub running_balance: Decimal,
}

/// First entry whose stored running balance disagrees with the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBreak {
    /// Offending entry.
    pub entry_id: LedgerEntryId,
    /// Its creation counter.
    pub account_version: i64,
    /// Balance the chain predicts.
    pub expected: Decimal,
    /// Balance actually stored.
    pub recorded: Decimal,
}

/// Walks links in creation order and reports the first break.
///
/// Links are sorted by `account_version` before walking.
#[must_use]
pub fn verify_chain(links: &[ChainLink]) -> Option<ChainBreak> {
    let mut ordered: Vec<&ChainLink> = links.iter().collect();
    ordered.sort_by_key(|l| l.account_version);

    let mut balance = Decimal::ZERO;
    for link in ordered {
        let expected = balance + link.amount;
        if expected != link.running_balance {
            return Some(ChainBreak {
                entry_id: link.entry_id,
                account_version: link.account_version,
                expected,
                recorded: link.running_balance,
            });
        }
        balance = link.running_balance;
    }
    None
}
