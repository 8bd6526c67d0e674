//! Shared types, errors, and configuration for Tallybook.
//!
//! This crate provides common types used across all other crates:
//! - Money rounding with decimal precision
//! - Typed IDs for type-safe entity references
//! - The error taxonomy shared by every engine error
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::ErrorKind;
