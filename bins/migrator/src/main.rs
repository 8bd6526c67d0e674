//! Database migration runner for Tallybook.
//!
//! Usage:
//!   migrator up      - Create the engine schema
//!   migrator down    - Drop the engine schema
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop everything and re-run migrations
//!
//! The target database is read from `DATABASE_URL`.

use sea_orm_migration::prelude::*;
use tallybook_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
