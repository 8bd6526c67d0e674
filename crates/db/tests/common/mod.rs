//! Shared fixtures for engine integration tests.
//!
//! Every test gets its own in-memory database with migrations applied.
//! The pool holds a single connection so the database lives as long as the
//! pool does.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tallybook_core::audit::Actor;
use tallybook_core::document::{DocumentInput, KindDetails, LineItemInput};
use tallybook_db::repositories::{
    CashBankRepository, ConversionRepository, CreateDocumentInput, CreateProductInput,
    DocumentRepository, DocumentWithLines, HistoryRepository, PartyRepository, PaymentRepository,
    SequenceRepository, StatusRepository, StockRepository,
};
use tallybook_db::{Migrator, connect};
use tallybook_shared::config::NumberingConfig;
use tallybook_shared::types::{PartyId, ProductId};

/// All repositories over one database.
pub struct Engine {
    pub db: DatabaseConnection,
    pub documents: DocumentRepository,
    pub payments: PaymentRepository,
    pub parties: PartyRepository,
    pub stock: StockRepository,
    pub cashbank: CashBankRepository,
    pub status: StatusRepository,
    pub conversion: ConversionRepository,
    pub sequences: SequenceRepository,
    pub history: HistoryRepository,
}

impl Engine {
    pub async fn new() -> Self {
        Self::with_numbering(NumberingConfig::default()).await
    }

    pub async fn with_numbering(numbering: NumberingConfig) -> Self {
        let db = connect("sqlite::memory:", 1)
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let numbering = Arc::new(numbering);
        Self {
            documents: DocumentRepository::new(db.clone(), Arc::clone(&numbering)),
            payments: PaymentRepository::new(db.clone(), Arc::clone(&numbering)),
            parties: PartyRepository::new(db.clone()),
            stock: StockRepository::new(db.clone()),
            cashbank: CashBankRepository::new(db.clone()),
            status: StatusRepository::new(db.clone()),
            conversion: ConversionRepository::new(db.clone(), Arc::clone(&numbering)),
            sequences: SequenceRepository::new(db.clone(), numbering),
            history: HistoryRepository::new(db.clone()),
            db,
        }
    }

    pub async fn party(&self, name: &str) -> PartyId {
        let id = PartyId::new();
        self.parties.create_party(id, name).await.expect("create party");
        id
    }

    pub async fn product(&self, name: &str, quantity: Decimal) -> ProductId {
        self.product_with(name, quantity, false, None).await
    }

    pub async fn product_with(
        &self,
        name: &str,
        quantity: Decimal,
        is_service: bool,
        expiry_date: Option<NaiveDate>,
    ) -> ProductId {
        let id = ProductId::new();
        self.stock
            .create_product(CreateProductInput {
                id,
                name: name.to_string(),
                is_service,
                quantity,
                expiry_date,
            })
            .await
            .expect("create product");
        id
    }

    pub async fn balance(&self, party: PartyId) -> Decimal {
        self.parties.balance(party).await.expect("party balance")
    }

    pub async fn quantity(&self, product: ProductId) -> Decimal {
        self.stock.get_product(product).await.expect("product").quantity
    }

    pub async fn create(&self, document: DocumentInput) -> DocumentWithLines {
        self.documents
            .create(CreateDocumentInput::new(document, actor()))
            .await
            .expect("create document")
    }
}

pub fn actor() -> Actor {
    Actor::system("test-runner")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A document of the given kind with sensible header defaults.
pub fn document(
    details: KindDetails,
    party: Option<PartyId>,
    lines: Vec<LineItemInput>,
) -> DocumentInput {
    DocumentInput {
        details,
        counterparty_id: party,
        counterparty_name: "Sharma Traders".to_string(),
        date: date(2026, 10, 1),
        lines,
        document_discount: Decimal::ZERO,
        notes: None,
        terms: None,
    }
}

pub fn sale(party: Option<PartyId>, lines: Vec<LineItemInput>) -> DocumentInput {
    document(
        KindDetails::SaleInvoice {
            due_date: Some(date(2026, 10, 31)),
        },
        party,
        lines,
    )
}

pub fn purchase(party: Option<PartyId>, lines: Vec<LineItemInput>) -> DocumentInput {
    document(
        KindDetails::PurchaseInvoice {
            due_date: Some(date(2026, 10, 31)),
            supplier_reference: Some("BILL-77".to_string()),
        },
        party,
        lines,
    )
}

pub fn estimate(party: Option<PartyId>, lines: Vec<LineItemInput>) -> DocumentInput {
    document(
        KindDetails::Estimate {
            valid_until: Some(date(2026, 10, 15)),
        },
        party,
        lines,
    )
}
