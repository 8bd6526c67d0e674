//! Core business rules for Tallybook.
//!
//! This crate contains pure bookkeeping logic with ZERO database dependencies.
//! Every rule the transactional engine enforces is decided here; the `db`
//! crate only sequences reads and writes around these decisions.
//!
//! # Modules
//!
//! - `amount` - Line and document total computation
//! - `document` - Document kinds, statuses, inputs and validation
//! - `sequence` - Human-readable document numbering
//! - `stock` - Stock availability and expiry checks
//! - `party` - Counterparty balance sign rules
//! - `cashbank` - Cash and bank running-balance chains
//! - `payment` - Payments, settlement and cheques
//! - `audit` - History actions and typed field diffs
//! - `workflow` - Document status state machine
//! - `conversion` - Estimate to invoice conversion

pub mod amount;
pub mod audit;
pub mod cashbank;
pub mod conversion;
pub mod document;
pub mod party;
pub mod payment;
pub mod sequence;
pub mod stock;
pub mod workflow;

#[cfg(test)]
mod amount_props;
