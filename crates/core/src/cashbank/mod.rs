//! Cash and bank running-balance ledgers.
//!
//! One append-only chain per account. The implicit cash drawer has no
//! account row; bank accounts additionally keep a denormalized
//! `current_balance`.

pub mod balance;
pub mod chain;
pub mod error;
pub mod types;

pub use balance::RunningBalance;
pub use chain::{ChainBreak, ChainLink, verify_chain};
pub use error::CashBankError;
pub use types::{LedgerAccount, MovementType};
