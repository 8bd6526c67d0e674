//! Property-based tests for amount computation.
//!
//! - Header identity: total = subtotal + tax - discount
//! - Every stored amount carries at most two decimals
//! - Line amount = taxable + tax

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::amount::{DocumentTotals, LineAmounts};

/// Quantities from 0.001 to 1,000.000.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 3))
}

/// Unit prices from 0.00 to 100,000.00.
fn unit_price() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Percentages from 0.00 to 100.00.
fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn line() -> impl Strategy<Value = LineAmounts> {
    (quantity(), unit_price(), percent(), percent())
        .prop_filter_map("amount overflow", |(q, p, d, t)| LineAmounts::compute(q, p, d, t))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Line amount always equals taxable plus tax and taxable equals base minus discount.
    #[test]
    fn prop_line_identity(line in line()) {
        prop_assert_eq!(line.taxable, line.base - line.discount);
        prop_assert_eq!(line.amount, line.taxable + line.tax);
        prop_assert!(line.discount <= line.base);
    }

    /// Every computed amount is already rounded to two decimals.
    #[test]
    fn prop_amounts_have_two_decimals(line in line()) {
        for value in [line.base, line.discount, line.taxable, line.tax, line.amount] {
            prop_assert!(value.normalize().scale() <= 2, "{} has more than 2 decimals", value);
        }
    }

    /// Document totals keep the header identity for any set of lines.
    #[test]
    fn prop_totals_identity(
        lines in prop::collection::vec(line(), 0..12),
        document_discount in (0i64..100_000i64).prop_map(|n| Decimal::new(n, 2)),
    ) {
        let totals = DocumentTotals::from_lines(&lines, document_discount).unwrap();
        prop_assert!(totals.is_consistent());
        let line_sum: Decimal = lines.iter().map(|l| l.amount).sum();
        prop_assert_eq!(totals.total, line_sum - document_discount);
    }

    /// amount_due + amount_paid always recovers the total.
    #[test]
    fn prop_amount_due_identity(
        lines in prop::collection::vec(line(), 1..6),
        paid in (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2)),
    ) {
        let totals = DocumentTotals::from_lines(&lines, Decimal::ZERO).unwrap();
        prop_assert_eq!(totals.amount_due(paid) + paid, totals.total);
    }
}
