//! Database layer and transactional engine for Tallybook.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations
//! - The transaction boundary every mutation runs through
//! - Repositories coordinating stock, balances, payments and history

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod tx;

pub use error::EngineError;
pub use migration::Migrator;
pub use repositories::{
    CashBankRepository, ConversionRepository, DocumentRepository, HistoryRepository,
    PartyRepository, PaymentRepository, SequenceRepository, StatusRepository, StockRepository,
};
pub use tx::with_transaction;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// SQLite allows one writer at a time; keep `max_connections` at 1 unless
/// the database is read-mostly.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections.max(1))
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);
    Database::connect(options).await
}
