//! Party balance ledger.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use tallybook_core::party::{BalanceAdjustment, BalanceEvent, BalanceSide};
use tallybook_shared::types::PartyId;
use tracing::{debug, info};

use crate::entities::parties;
use crate::error::EngineError;
use crate::tx::with_transaction;

/// Adds `delta` to a party's balance.
///
/// The new balance is computed in `Decimal` and written back; money columns
/// are REAL in SQLite and must not be summed by the database.
pub async fn adjust<C: ConnectionTrait>(
    conn: &C,
    party_id: PartyId,
    delta: Decimal,
) -> Result<(), EngineError> {
    let party = ensure_exists(conn, party_id).await?;
    let balance = party.current_balance + delta;

    parties::Entity::update_many()
        .col_expr(parties::Column::CurrentBalance, Expr::value(balance))
        .col_expr(parties::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(parties::Column::Id.eq(party_id.into_inner()))
        .exec(conn)
        .await?;

    debug!(party_id = %party_id, %delta, %balance, "Party balance adjusted");
    Ok(())
}

/// Applies the balance effect of `event` when the document has a party.
pub async fn apply_event<C: ConnectionTrait>(
    conn: &C,
    party_id: Option<PartyId>,
    side: BalanceSide,
    event: BalanceEvent,
) -> Result<(), EngineError> {
    let Some(party_id) = party_id else {
        return Ok(());
    };
    match BalanceAdjustment::for_event(party_id, side, event) {
        Some(adjustment) => adjust(conn, adjustment.party_id, adjustment.delta).await,
        None => Ok(()),
    }
}

/// Fails unless the party exists.
pub async fn ensure_exists<C: ConnectionTrait>(
    conn: &C,
    party_id: PartyId,
) -> Result<parties::Model, EngineError> {
    parties::Entity::find_by_id(party_id.into_inner())
        .one(conn)
        .await?
        .ok_or(EngineError::PartyNotFound(party_id))
}

/// Party repository.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a party with a zero balance.
    pub async fn create_party(
        &self,
        party_id: PartyId,
        name: &str,
    ) -> Result<parties::Model, EngineError> {
        let name = name.to_string();
        let now = Utc::now();
        let party = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let party = parties::ActiveModel {
                    id: Set(party_id.into_inner()),
                    name: Set(name),
                    current_balance: Set(Decimal::ZERO),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                Ok(party.insert(txn).await?)
            })
        })
        .await?;

        info!(party_id = %party_id, name = %party.name, "Party created");
        Ok(party)
    }

    /// Gets a party by ID.
    pub async fn get_party(&self, party_id: PartyId) -> Result<parties::Model, EngineError> {
        ensure_exists(&self.db, party_id).await
    }

    /// Current balance of a party.
    pub async fn balance(&self, party_id: PartyId) -> Result<Decimal, EngineError> {
        Ok(self.get_party(party_id).await?.current_balance)
    }
}
