//! Sample data seeder for Tallybook development.
//!
//! Creates a customer, a supplier, a few products, a bank account and one
//! partly paid sale invoice. Rows use fixed IDs, so running it twice
//! leaves the first run's data in place.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Local};
use rust_decimal::Decimal;
use sea_orm::SqlErr;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tallybook_core::audit::Actor;
use tallybook_core::document::{DocumentInput, KindDetails, LineItemInput};
use tallybook_core::payment::PaymentMode;
use tallybook_db::repositories::{
    CashBankRepository, CreateDocumentInput, CreateProductInput, DocumentRepository,
    InitialPayment, PartyRepository, StockRepository,
};
use tallybook_db::{EngineError, Migrator, connect};
use tallybook_shared::AppConfig;
use tallybook_shared::types::{BankAccountId, DocumentId, PartyId, PaymentId, ProductId};

const CUSTOMER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0101);
const SUPPLIER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0102);
const RICE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0201);
const OIL_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0202);
const DELIVERY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0203);
const BANK_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0301);
const INVOICE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0401);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tallybook=debug,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database.url, config.database.max_connections).await?;
    Migrator::up(&db, None).await?;
    info!(url = %config.database.url, "Connected and migrated");

    let actor = Actor::system(config.audit.default_actor_name.clone());
    let numbering = Arc::new(config.numbering.clone());

    let parties = PartyRepository::new(db.clone());
    for (id, name) in [(CUSTOMER_ID, "Sharma Traders"), (SUPPLIER_ID, "Gupta Wholesale")] {
        skip_existing(parties.create_party(PartyId::from(id), name).await, name)?;
    }

    let stock = StockRepository::new(db.clone());
    let products = [
        (RICE_ID, "Basmati Rice 5kg", false, Decimal::new(40, 0)),
        (OIL_ID, "Sunflower Oil 1L", false, Decimal::new(60, 0)),
        (DELIVERY_ID, "Home delivery", true, Decimal::ZERO),
    ];
    for (id, name, is_service, quantity) in products {
        let created = stock
            .create_product(CreateProductInput {
                id: ProductId::from(id),
                name: name.to_string(),
                is_service,
                quantity,
                expiry_date: None,
            })
            .await;
        skip_existing(created, name)?;
    }

    let cashbank = CashBankRepository::new(db.clone());
    skip_existing(
        cashbank
            .create_bank_account(
                BankAccountId::from(BANK_ID),
                "HDFC Current",
                Some("50200012345678".to_string()),
            )
            .await,
        "HDFC Current",
    )?;

    let documents = DocumentRepository::new(db.clone(), numbering);
    if documents.get(DocumentId::from(INVOICE_ID)).await.is_ok() {
        info!("Sample invoice already exists, skipping");
    } else {
        let today = Local::now().date_naive();
        let invoice = DocumentInput {
            details: KindDetails::SaleInvoice {
                due_date: Some(today + Duration::days(15)),
            },
            counterparty_id: Some(PartyId::from(CUSTOMER_ID)),
            counterparty_name: "Sharma Traders".to_string(),
            date: today,
            lines: vec![
                LineItemInput::new("Basmati Rice 5kg", Decimal::new(3, 0), Decimal::new(100, 0))
                    .with_product(ProductId::from(RICE_ID))
                    .with_rates(Decimal::new(10, 0), Decimal::new(5, 0)),
                LineItemInput::new("Home delivery", Decimal::ONE, Decimal::new(40, 0))
                    .with_product(ProductId::from(DELIVERY_ID)),
            ],
            document_discount: Decimal::ZERO,
            notes: Some("Seeded sample".to_string()),
            terms: None,
        };

        let mut input = CreateDocumentInput::new(invoice, actor);
        input.document_id = DocumentId::from(INVOICE_ID);
        input.initial_payment = Some(InitialPayment {
            payment_id: PaymentId::new(),
            amount: Decimal::new(200, 0),
            mode: PaymentMode::Cash,
            reference: None,
        });
        let created = documents.create(input).await?;
        info!(
            number = %created.document.number,
            total = %created.document.total,
            amount_due = %created.document.amount_due,
            "Sample invoice created"
        );
    }

    info!("Seeding complete");
    Ok(())
}

/// Treats a unique-key failure as "already seeded".
fn skip_existing<T>(result: Result<T, EngineError>, what: &str) -> anyhow::Result<()> {
    match result {
        Ok(_) => {
            info!(what, "Seeded");
            Ok(())
        }
        Err(EngineError::Database(err))
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
        {
            info!(what, "Already exists, skipping");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
