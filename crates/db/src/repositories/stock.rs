//! Stock ledger.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};
use tallybook_core::stock::{StockDirection, StockError, StockLine, StockService};
use tallybook_shared::types::ProductId;
use tracing::{debug, info};

use crate::entities::products;
use crate::error::EngineError;
use crate::tx::with_transaction;

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Caller-issued ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Services are never stock-checked.
    pub is_service: bool,
    /// Opening quantity.
    pub quantity: Decimal,
    /// Optional expiry date.
    pub expiry_date: Option<NaiveDate>,
}

async fn find_product<C: ConnectionTrait>(
    conn: &C,
    product_id: ProductId,
) -> Result<products::Model, EngineError> {
    products::Entity::find_by_id(product_id.into_inner())
        .one(conn)
        .await?
        .ok_or(EngineError::ProductNotFound(product_id))
}

async fn apply<C, F>(conn: &C, lines: &[StockLine], check: F) -> Result<(), EngineError>
where
    C: ConnectionTrait,
    F: Fn(&products::Model, Decimal) -> Result<Decimal, StockError>,
{
    for line in StockService::aggregate(lines) {
        let product = find_product(conn, line.product_id).await?;
        let delta = check(&product, line.quantity)?;
        if delta.is_zero() {
            continue;
        }

        let quantity = product.quantity + delta;
        debug!(product_id = %line.product_id, %delta, %quantity, "Stock movement");
        let mut active: products::ActiveModel = product.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());
        active.update(conn).await?;
    }
    Ok(())
}

/// Commits the stock movement of a document's lines.
///
/// Outbound movements check expiry against `today` and availability;
/// inbound movements only add.
pub async fn reserve<C: ConnectionTrait>(
    conn: &C,
    direction: StockDirection,
    lines: &[StockLine],
    today: NaiveDate,
) -> Result<(), EngineError> {
    apply(conn, lines, |product, quantity| {
        StockService::reserve(direction, &product.stock(), quantity, today)
    })
    .await
}

/// Undoes the stock movement of a document's lines.
pub async fn release<C: ConnectionTrait>(
    conn: &C,
    direction: StockDirection,
    lines: &[StockLine],
) -> Result<(), EngineError> {
    apply(conn, lines, |product, quantity| {
        StockService::release(direction, &product.stock(), quantity)
    })
    .await
}

/// Stock repository.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a product.
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, EngineError> {
        let now = Utc::now();
        let product = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let product = products::ActiveModel {
                    id: Set(input.id.into_inner()),
                    name: Set(input.name),
                    is_service: Set(input.is_service),
                    quantity: Set(input.quantity),
                    expiry_date: Set(input.expiry_date),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                Ok(product.insert(txn).await?)
            })
        })
        .await?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, product_id: ProductId) -> Result<products::Model, EngineError> {
        find_product(&self.db, product_id).await
    }
}
