//! Human-readable document numbering.
//!
//! Every sequence kind owns one counter. Numbers are formatted as
//! `{PREFIX}-{NNNN}` and handed out strictly monotonically; a number is
//! never returned to the pool, not even when its document is deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use tallybook_shared::config::{NumberingConfig, SequenceOverride};

/// Default zero-padding width.
pub const DEFAULT_PADDING: u32 = 4;

/// Default first number for every sequence.
pub const DEFAULT_START: i64 = 1001;

/// The counters maintained by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    /// Sale invoices.
    SaleInvoice,
    /// Purchase invoices.
    PurchaseInvoice,
    /// Estimates / quotations.
    Estimate,
    /// Credit notes.
    CreditNote,
    /// Incoming payments (receipts).
    PaymentIn,
    /// Outgoing payments.
    PaymentOut,
    /// Expenses.
    Expense,
    /// Cheques.
    Cheque,
}

impl SequenceKind {
    /// All sequence kinds.
    pub const ALL: [Self; 8] = [
        Self::SaleInvoice,
        Self::PurchaseInvoice,
        Self::Estimate,
        Self::CreditNote,
        Self::PaymentIn,
        Self::PaymentOut,
        Self::Expense,
        Self::Cheque,
    ];

    /// Returns the string representation stored in the counter table.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleInvoice => "sale_invoice",
            Self::PurchaseInvoice => "purchase_invoice",
            Self::Estimate => "estimate",
            Self::CreditNote => "credit_note",
            Self::PaymentIn => "payment_in",
            Self::PaymentOut => "payment_out",
            Self::Expense => "expense",
            Self::Cheque => "cheque",
        }
    }

    /// Parses a sequence kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Returns the built-in prefix of the sequence.
    #[must_use]
    pub fn default_prefix(&self) -> &'static str {
        match self {
            Self::SaleInvoice => "INV",
            Self::PurchaseInvoice => "PUR",
            Self::Estimate => "EST",
            Self::CreditNote => "CN",
            Self::PaymentIn => "REC",
            Self::PaymentOut => "PAY",
            Self::Expense => "EXP",
            Self::Cheque => "CHQ",
        }
    }

    /// Returns the built-in seed of the sequence.
    #[must_use]
    pub fn default_seed(&self) -> SequenceSeed {
        SequenceSeed {
            prefix: self.default_prefix().to_string(),
            start: DEFAULT_START,
            padding: DEFAULT_PADDING,
        }
    }

    /// Returns the seed with any configured override applied.
    #[must_use]
    pub fn seed(&self, numbering: &NumberingConfig) -> SequenceSeed {
        let seed = self.default_seed();
        match numbering.get(self.as_str()) {
            Some(o) => seed.with_override(o),
            None => seed,
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Values a counter is created with on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSeed {
    /// Number prefix.
    pub prefix: String,
    /// First number handed out.
    pub start: i64,
    /// Zero-padding width.
    pub padding: u32,
}

impl SequenceSeed {
    /// Applies a configuration override on top of this seed.
    #[must_use]
    pub fn with_override(self, o: &SequenceOverride) -> Self {
        Self {
            prefix: o.prefix.clone().unwrap_or(self.prefix),
            start: o.start.unwrap_or(self.start),
            padding: o.padding.unwrap_or(self.padding),
        }
    }
}

/// Current state of a counter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceState {
    /// Number prefix.
    pub prefix: String,
    /// Next number to hand out.
    pub next_number: i64,
    /// Zero-padding width.
    pub padding: u32,
}

impl SequenceState {
    /// Creates the state of a freshly seeded counter.
    #[must_use]
    pub fn seeded(seed: &SequenceSeed) -> Self {
        Self {
            prefix: seed.prefix.clone(),
            next_number: seed.start,
            padding: seed.padding,
        }
    }

    /// Returns the number the next allocation would produce.
    #[must_use]
    pub fn peek(&self) -> String {
        format_number(&self.prefix, self.next_number, self.padding)
    }

    /// Hands out the next number and advances the counter.
    pub fn allocate(&mut self) -> String {
        let number = self.peek();
        self.next_number += 1;
        number
    }
}

/// Formats a document number as `{prefix}-{number zero-padded to padding}`.
#[must_use]
pub fn format_number(prefix: &str, number: i64, padding: u32) -> String {
    let width = padding as usize;
    format!("{prefix}-{number:0>width$}")
}
