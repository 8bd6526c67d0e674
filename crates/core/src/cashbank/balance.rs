//! Running balance calculation for cash and bank chains.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running balance information for a ledger entry.
///
/// - `account_version` orders entries by creation, never by their date
/// - `previous_balance` is the running balance of the prior entry
/// - `current_balance` is what gets stored as `running_balance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Per-account creation counter, starting at 1.
    pub account_version: i64,
    /// Balance before this entry.
    pub previous_balance: Decimal,
    /// Balance after this entry.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Running balance of the first entry on an account.
    #[must_use]
    pub fn first_entry(amount: Decimal) -> Self {
        Self {
            account_version: 1,
            previous_balance: Decimal::ZERO,
            current_balance: amount,
        }
    }

    /// Running balance of the entry that follows `previous`.
    #[must_use]
    pub fn next_entry(previous: &Self, amount: Decimal) -> Self {
        Self {
            account_version: previous.account_version + 1,
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance + amount,
        }
    }

    /// Running balance after the latest stored entry, if any.
    #[must_use]
    pub fn append(latest: Option<&Self>, amount: Decimal) -> Self {
        match latest {
            Some(previous) => Self::next_entry(previous, amount),
            None => Self::first_entry(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_entry() {
        let rb = RunningBalance::first_entry(dec!(100));
        assert_eq!(rb.account_version, 1);
        assert_eq!(rb.previous_balance, Decimal::ZERO);
        assert_eq!(rb.current_balance, dec!(100));
    }

    #[test]
    fn test_append_without_history_starts_chain() {
        assert_eq!(
            RunningBalance::append(None, dec!(-40)),
            RunningBalance::first_entry(dec!(-40))
        );
    }

    #[test]
    fn test_next_entry_can_go_negative() {
        let first = RunningBalance::first_entry(dec!(100));
        let second = RunningBalance::next_entry(&first, dec!(-150));
        assert_eq!(second.account_version, 2);
        assert_eq!(second.previous_balance, dec!(100));
        assert_eq!(second.current_balance, dec!(-50));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (-100_000i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// current[N] = previous[N] + amount and previous[N] = current[N-1].
        #[test]
        fn prop_chain_consistency(amounts in prop::collection::vec(amount_strategy(), 1..=50)) {
            let mut latest: Option<RunningBalance> = None;
            let mut sum = Decimal::ZERO;

            for (i, amount) in amounts.iter().enumerate() {
                let next = RunningBalance::append(latest.as_ref(), *amount);
                if let Some(prev) = latest {
                    prop_assert_eq!(next.previous_balance, prev.current_balance);
                }
                prop_assert_eq!(next.current_balance, next.previous_balance + *amount);
                prop_assert_eq!(next.account_version, i64::try_from(i).unwrap() + 1);
                sum += *amount;
                latest = Some(next);
            }

            prop_assert_eq!(latest.map(|l| l.current_balance), Some(sum));
        }
    }
}
