//! Transaction boundary.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};

use crate::error::EngineError;

/// Runs `f` inside one database transaction.
///
/// Commits when `f` returns `Ok`, rolls back on `Err`. Every engine write
/// goes through here.
///
/// ```ignore
/// with_transaction(&db, move |txn| {
///     Box::pin(async move { sequence::next_number(txn, kind, &numbering).await })
/// })
/// .await
/// ```
pub async fn with_transaction<F, T>(db: &DatabaseConnection, f: F) -> Result<T, EngineError>
where
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = Result<T, EngineError>> + Send + 'c>>
        + Send,
    T: Send,
{
    db.transaction::<F, T, EngineError>(f)
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => EngineError::Database(db_err),
            TransactionError::Transaction(err) => err,
        })
}
