//! Document status workflow.
//!
//! # Modules
//!
//! - `types` - Transition results (StatusEffect, TransitionCause)
//! - `error` - Status errors
//! - `service` - Per-kind transition tables

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::StatusError;
pub use service::StatusMachine;
pub use types::{StatusEffect, TransitionCause};
