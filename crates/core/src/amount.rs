//! Line and document amount computation.
//!
//! Rounding is half away from zero to two decimals and is applied at every
//! intermediate step, so the stored per-line amounts match what the user saw
//! when the document was entered:
//!
//! ```text
//! base     = round2(quantity * unit_price)
//! discount = round2(base * discount_percent / 100)
//! taxable  = base - discount
//! tax      = round2(taxable * tax_percent / 100)
//! amount   = taxable + tax
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{percent_of, round_money};

/// Computed amounts for a single line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// Quantity times unit price, before discount.
    pub base: Decimal,
    /// Discount taken off the base.
    pub discount: Decimal,
    /// Base minus discount.
    pub taxable: Decimal,
    /// Tax on the discounted base.
    pub tax: Decimal,
    /// Final line amount (taxable + tax).
    pub amount: Decimal,
}

impl LineAmounts {
    /// Computes the amounts for one line.
    ///
    /// Returns `None` if any step overflows `Decimal`.
    #[must_use]
    pub fn compute(
        quantity: Decimal,
        unit_price: Decimal,
        discount_percent: Decimal,
        tax_percent: Decimal,
    ) -> Option<Self> {
        let base = round_money(quantity.checked_mul(unit_price)?);
        let discount = percent_of(base, discount_percent)?;
        let taxable = base.checked_sub(discount)?;
        let tax = percent_of(taxable, tax_percent)?;

        Some(Self {
            base,
            discount,
            taxable,
            tax,
            amount: taxable.checked_add(tax)?,
        })
    }
}

/// Header totals of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line bases (pre-discount).
    pub subtotal: Decimal,
    /// Sum of line taxes.
    pub tax_amount: Decimal,
    /// Sum of line discounts plus the document-level discount.
    pub discount_amount: Decimal,
    /// `subtotal + tax_amount - discount_amount`.
    pub total: Decimal,
}

impl DocumentTotals {
    /// Aggregates line amounts and an optional document-level discount.
    ///
    /// Returns `None` if a sum overflows `Decimal`.
    #[must_use]
    pub fn from_lines(lines: &[LineAmounts], document_discount: Decimal) -> Option<Self> {
        let sum = |field: fn(&LineAmounts) -> Decimal| {
            lines
                .iter()
                .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(field(line)))
        };
        let subtotal = sum(|l| l.base)?;
        let tax_amount = sum(|l| l.tax)?;
        let discount_amount = sum(|l| l.discount)?.checked_add(round_money(document_discount))?;

        Some(Self {
            subtotal,
            tax_amount,
            discount_amount,
            total: subtotal.checked_add(tax_amount)?.checked_sub(discount_amount)?,
        })
    }

    /// Returns the outstanding amount given what has been paid so far.
    #[must_use]
    pub fn amount_due(&self, amount_paid: Decimal) -> Decimal {
        amount_due(self.total, amount_paid)
    }

    /// Returns true if the header identity holds.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total == self.subtotal + self.tax_amount - self.discount_amount
    }
}

/// Outstanding amount of a document.
#[must_use]
pub fn amount_due(total: Decimal, amount_paid: Decimal) -> Decimal {
    total - amount_paid
}
