//! `SeaORM` entity definitions.
//!
//! Enum-valued columns are stored as snake_case text and converted with
//! the `parse`/`as_str` pairs of the matching `tallybook-core` types.

pub mod bank_accounts;
pub mod cheques;
pub mod documents;
pub mod history_entries;
pub mod ledger_entries;
pub mod line_items;
pub mod parties;
pub mod payments;
pub mod products;
pub mod sequence_counters;
