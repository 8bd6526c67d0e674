//! Integration tests for the document mutation coordinator.

mod common;

use common::{Engine, actor, date, purchase, sale};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use tallybook_core::audit::{DocumentField, FieldValue, HistoryAction};
use tallybook_core::document::{
    DocumentError, DocumentInput, DocumentStatus, KindDetails, LineItemInput,
};
use tallybook_core::payment::PaymentInput;
use tallybook_core::sequence::SequenceKind;
use tallybook_core::stock::StockError;
use tallybook_db::EngineError;
use tallybook_db::entities::{documents, line_items};
use tallybook_db::repositories::{CreateDocumentInput, UpdateDocumentInput};
use tallybook_shared::types::{DocumentId, PartyId};

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_sale_invoice_applies_every_effect() {
    let engine = Engine::new().await;
    let party = engine.party("Sharma Traders").await;
    let rice = engine.product("Basmati Rice 5kg", dec!(10)).await;

    let created = engine
        .create(sale(
            Some(party),
            vec![
                LineItemInput::new("Basmati Rice 5kg", dec!(3), dec!(100))
                    .with_product(rice)
                    .with_rates(dec!(10), dec!(5)),
            ],
        ))
        .await;

    let doc = &created.document;
    assert_eq!(doc.number, "INV-1001");
    assert_eq!(doc.status().unwrap(), DocumentStatus::Unpaid);
    assert_eq!(doc.subtotal, dec!(300));
    assert_eq!(doc.discount_amount, dec!(30));
    assert_eq!(doc.tax_amount, dec!(13.5));
    assert_eq!(doc.total, dec!(283.5));
    assert_eq!(doc.amount_paid, Decimal::ZERO);
    assert_eq!(doc.amount_due, dec!(283.5));
    assert_eq!(created.lines.len(), 1);
    assert_eq!(created.lines[0].amount, dec!(283.5));

    assert_eq!(engine.quantity(rice).await, dec!(7));
    assert_eq!(engine.balance(party).await, dec!(283.5));

    let history = engine.documents.history(doc.document_id()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action().unwrap(), HistoryAction::Created);
    assert_eq!(history[0].description, "Sale invoice INV-1001 created");
    assert_eq!(history[0].actor_name, "test-runner");
}

#[tokio::test]
async fn test_insufficient_stock_leaves_no_trace() {
    let engine = Engine::new().await;
    let party = engine.party("Sharma Traders").await;
    let rice = engine.product("Basmati Rice 5kg", dec!(2)).await;

    let err = engine
        .documents
        .create(CreateDocumentInput::new(
            sale(
                Some(party),
                vec![LineItemInput::new("Basmati Rice 5kg", dec!(5), dec!(100)).with_product(rice)],
            ),
            actor(),
        ))
        .await
        .unwrap_err();

    match err {
        EngineError::Stock(StockError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, dec!(2));
            assert_eq!(requested, dec!(5));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(documents::Entity::find().count(&engine.db).await.unwrap(), 0);
    assert_eq!(line_items::Entity::find().count(&engine.db).await.unwrap(), 0);
    assert_eq!(engine.quantity(rice).await, dec!(2));
    assert_eq!(engine.balance(party).await, Decimal::ZERO);
    assert_eq!(
        engine.sequences.peek_number(SequenceKind::SaleInvoice).await.unwrap(),
        "INV-1001"
    );
}

#[tokio::test]
async fn test_expired_product_is_rejected() {
    let engine = Engine::new().await;
    let milk = engine
        .product_with("Milk 1L", dec!(50), false, Some(common::date(2020, 1, 1)))
        .await;

    let err = engine
        .documents
        .create(CreateDocumentInput::new(
            sale(None, vec![LineItemInput::new("Milk 1L", dec!(1), dec!(60)).with_product(milk)]),
            actor(),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "EXPIRED_PRODUCT");
    assert_eq!(engine.quantity(milk).await, dec!(50));
}

#[tokio::test]
async fn test_services_and_free_text_lines_skip_stock() {
    let engine = Engine::new().await;
    let delivery = engine
        .product_with("Delivery", Decimal::ZERO, true, None)
        .await;

    let created = engine
        .create(sale(
            None,
            vec![
                LineItemInput::new("Delivery", dec!(2), dec!(50)).with_product(delivery),
                LineItemInput::new("Gift wrap", dec!(1), dec!(20)),
            ],
        ))
        .await;

    assert_eq!(created.document.total, dec!(120));
    assert_eq!(engine.quantity(delivery).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_purchase_invoice_adds_stock_and_payable() {
    let engine = Engine::new().await;
    let supplier = engine.party("Gupta Wholesale").await;
    let oil = engine.product("Sunflower Oil 1L", dec!(4)).await;

    let created = engine
        .create(purchase(
            Some(supplier),
            vec![LineItemInput::new("Sunflower Oil 1L", dec!(12), dec!(150)).with_product(oil)],
        ))
        .await;

    assert_eq!(created.document.number, "PUR-1001");
    assert_eq!(created.document.supplier_reference.as_deref(), Some("BILL-77"));
    assert_eq!(engine.quantity(oil).await, dec!(16));
    assert_eq!(engine.balance(supplier).await, dec!(-1800));
}

#[tokio::test]
async fn test_estimate_has_no_stock_or_balance_effect() {
    let engine = Engine::new().await;
    let party = engine.party("Sharma Traders").await;
    let rice = engine.product("Basmati Rice 5kg", dec!(1)).await;

    let created = engine
        .create(common::estimate(
            Some(party),
            vec![LineItemInput::new("Basmati Rice 5kg", dec!(5), dec!(100)).with_product(rice)],
        ))
        .await;

    assert_eq!(created.document.number, "EST-1001");
    assert_eq!(created.document.status().unwrap(), DocumentStatus::Sent);
    assert_eq!(engine.quantity(rice).await, dec!(1));
    assert_eq!(engine.balance(party).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_draft_and_caller_number() {
    let engine = Engine::new().await;

    let mut input = CreateDocumentInput::new(
        sale(None, vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]),
        actor(),
    );
    input.as_draft = true;
    input.number = Some("OLD-0042".to_string());
    let created = engine.documents.create(input).await.unwrap();

    assert_eq!(created.document.number, "OLD-0042");
    assert_eq!(created.document.status().unwrap(), DocumentStatus::Draft);
    assert_eq!(
        engine.sequences.peek_number(SequenceKind::SaleInvoice).await.unwrap(),
        "INV-1001"
    );
}

#[tokio::test]
async fn test_due_date_before_date_is_rejected() {
    let engine = Engine::new().await;
    let mut input = sale(None, vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]);
    input.details = KindDetails::SaleInvoice {
        due_date: Some(common::date(2026, 9, 1)),
    };

    let err = engine
        .documents
        .create(CreateDocumentInput::new(input, actor()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Document(DocumentError::DueDateBeforeDocumentDate { .. })
    ));
    assert_eq!(documents::Entity::find().count(&engine.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_party_rolls_back() {
    let engine = Engine::new().await;
    let ghost = PartyId::new();

    let err = engine
        .documents
        .create(CreateDocumentInput::new(
            sale(Some(ghost), vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]),
            actor(),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::PartyNotFound(id) if id == ghost));
    assert_eq!(documents::Entity::find().count(&engine.db).await.unwrap(), 0);
}

// ============================================================================
// Sequence
// ============================================================================

#[tokio::test]
async fn test_numbers_are_never_reused_after_delete() {
    let engine = Engine::new().await;
    let line = || vec![LineItemInput::new("Notebook", dec!(1), dec!(40))];

    let first = engine.create(sale(None, line())).await;
    let second = engine.create(sale(None, line())).await;
    assert_eq!(first.document.number, "INV-1001");
    assert_eq!(second.document.number, "INV-1002");

    engine
        .documents
        .delete(second.document.document_id(), actor())
        .await
        .unwrap();

    let third = engine.create(sale(None, line())).await;
    assert_eq!(third.document.number, "INV-1003");
}

#[tokio::test]
async fn test_aborted_create_does_not_consume_a_number() {
    let engine = Engine::new().await;
    let rice = engine.product("Basmati Rice 5kg", dec!(1)).await;

    let failed = engine
        .documents
        .create(CreateDocumentInput::new(
            sale(None, vec![LineItemInput::new("Rice", dec!(9), dec!(100)).with_product(rice)]),
            actor(),
        ))
        .await;
    assert!(failed.is_err());

    let ok = engine
        .create(sale(None, vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]))
        .await;
    assert_eq!(ok.document.number, "INV-1001");
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_moves_stock_and_records_diff() {
    let engine = Engine::new().await;
    let party = engine.party("Sharma Traders").await;
    let rice = engine.product("Basmati Rice 5kg", dec!(10)).await;
    let created = engine
        .create(sale(
            Some(party),
            vec![LineItemInput::new("Basmati Rice 5kg", dec!(3), dec!(100)).with_product(rice)],
        ))
        .await;
    let id = created.document.document_id();

    let mut revised = created.to_input().unwrap();
    revised.lines[0].quantity = dec!(5);
    revised.notes = Some("Deliver before Diwali".to_string());
    let updated = engine
        .documents
        .update(UpdateDocumentInput {
            document_id: id,
            document: revised,
            rebalance_party: false,
            actor: actor(),
        })
        .await
        .unwrap();

    assert_eq!(updated.document.number, "INV-1001");
    assert_eq!(updated.document.total, dec!(500));
    assert_eq!(updated.document.amount_due, dec!(500));
    assert_eq!(engine.quantity(rice).await, dec!(5));
    // Balance stays at the creation total without the opt-in flag.
    assert_eq!(engine.balance(party).await, dec!(300));

    let history = engine.documents.history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action().unwrap(), HistoryAction::Updated);
    let changes = history[1].changes().unwrap();
    let total = changes
        .iter()
        .find(|c| c.field == DocumentField::Total)
        .expect("total change");
    assert_eq!(total.old, FieldValue::Money(dec!(300)));
    assert_eq!(total.new, FieldValue::Money(dec!(500)));
    assert!(changes.iter().any(|c| c.field == DocumentField::Notes));
    assert!(!changes.iter().any(|c| c.field == DocumentField::Date));
}

#[tokio::test]
async fn test_update_without_changes_writes_no_history() {
    let engine = Engine::new().await;
    let created = engine
        .create(sale(None, vec![LineItemInput::new("Notebook", dec!(2), dec!(40))]))
        .await;
    let id = created.document.document_id();

    engine
        .documents
        .update(UpdateDocumentInput {
            document_id: id,
            document: created.to_input().unwrap(),
            rebalance_party: false,
            actor: actor(),
        })
        .await
        .unwrap();

    assert_eq!(engine.documents.history(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_swapping_product_records_line_change() {
    let engine = Engine::new().await;
    let rice = engine.product("Basmati Rice 5kg", dec!(10)).await;
    let oil = engine.product("Sunflower Oil 1L", dec!(10)).await;
    let created = engine
        .create(sale(
            None,
            vec![LineItemInput::new("Basmati Rice 5kg", dec!(2), dec!(50)).with_product(rice)],
        ))
        .await;
    let id = created.document.document_id();

    let mut revised = created.to_input().unwrap();
    revised.lines[0] = LineItemInput::new("Sunflower Oil 1L", dec!(2), dec!(50)).with_product(oil);
    let updated = engine
        .documents
        .update(UpdateDocumentInput {
            document_id: id,
            document: revised,
            rebalance_party: false,
            actor: actor(),
        })
        .await
        .unwrap();

    assert_eq!(updated.document.total, created.document.total);
    assert_eq!(engine.quantity(rice).await, dec!(10));
    assert_eq!(engine.quantity(oil).await, dec!(8));

    let history = engine.documents.history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action().unwrap(), HistoryAction::Updated);
    let changes = history[1].changes().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].field, DocumentField::Lines);
    let FieldValue::Lines(old_lines) = &changes[0].old else {
        panic!("expected line values, got {:?}", changes[0].old);
    };
    let FieldValue::Lines(new_lines) = &changes[0].new else {
        panic!("expected line values, got {:?}", changes[0].new);
    };
    assert_eq!(old_lines[0].product_id, Some(rice));
    assert_eq!(new_lines[0].product_id, Some(oil));
}

async fn revise_total(engine: &Engine, id: DocumentId, input: &DocumentInput, price: Decimal) {
    let mut revised = input.clone();
    revised.lines[0].unit_price = price;
    engine
        .documents
        .update(UpdateDocumentInput {
            document_id: id,
            document: revised,
            rebalance_party: false,
            actor: actor(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_raising_total_reopens_paid_invoice() {
    let engine = Engine::new().await;
    let party = engine.party("Sharma Traders").await;
    let created = engine
        .create(sale(Some(party), vec![LineItemInput::new("Mixer", dec!(1), dec!(500))]))
        .await;
    let id = created.document.document_id();
    engine
        .payments
        .record(PaymentInput::cash(id, dec!(500), date(2026, 10, 2)), actor())
        .await
        .unwrap();

    revise_total(&engine, id, &created.to_input().unwrap(), dec!(650)).await;

    let doc = engine.documents.get(id).await.unwrap().document;
    assert_eq!(doc.amount_due, dec!(150));
    assert_eq!(doc.status().unwrap(), DocumentStatus::Partial);

    let history = engine.documents.history(id).await.unwrap();
    let update = history.last().unwrap();
    assert_eq!(update.action().unwrap(), HistoryAction::Updated);
    let status = update
        .changes()
        .unwrap()
        .into_iter()
        .find(|c| c.field == DocumentField::Status)
        .expect("status change");
    assert_eq!(status.old, FieldValue::Status(DocumentStatus::Paid));
    assert_eq!(status.new, FieldValue::Status(DocumentStatus::Partial));

    // The reopened invoice is visible to the overdue sweep again.
    let moved = engine
        .status
        .mark_overdue(date(2026, 11, 15), actor())
        .await
        .unwrap();
    assert_eq!(moved, vec![id]);
}

#[tokio::test]
async fn test_update_lowering_total_below_paid_settles_invoice() {
    let engine = Engine::new().await;
    let party = engine.party("Sharma Traders").await;
    let created = engine
        .create(sale(Some(party), vec![LineItemInput::new("Mixer", dec!(1), dec!(500))]))
        .await;
    let id = created.document.document_id();
    engine
        .payments
        .record(PaymentInput::cash(id, dec!(300), date(2026, 10, 2)), actor())
        .await
        .unwrap();

    revise_total(&engine, id, &created.to_input().unwrap(), dec!(250)).await;

    let doc = engine.documents.get(id).await.unwrap().document;
    assert_eq!(doc.amount_due, dec!(-50));
    assert_eq!(doc.status().unwrap(), DocumentStatus::Paid);

    let changes = engine.documents.history(id).await.unwrap().pop().unwrap().changes().unwrap();
    assert!(changes.iter().any(|c| c.field == DocumentField::Status
        && c.new == FieldValue::Status(DocumentStatus::Paid)));

    let moved = engine
        .status
        .mark_overdue(date(2026, 11, 15), actor())
        .await
        .unwrap();
    assert!(moved.is_empty());
}

#[tokio::test]
async fn test_update_with_rebalance_moves_party_balance() {
    let engine = Engine::new().await;
    let first = engine.party("Sharma Traders").await;
    let second = engine.party("Mehta Stores").await;
    let created = engine
        .create(sale(Some(first), vec![LineItemInput::new("Notebook", dec!(10), dec!(40))]))
        .await;

    let mut revised = created.to_input().unwrap();
    revised.lines[0].quantity = dec!(5);
    engine
        .documents
        .update(UpdateDocumentInput {
            document_id: created.document.document_id(),
            document: revised.clone(),
            rebalance_party: true,
            actor: actor(),
        })
        .await
        .unwrap();
    assert_eq!(engine.balance(first).await, dec!(200));

    revised.counterparty_id = Some(second);
    revised.counterparty_name = "Mehta Stores".to_string();
    engine
        .documents
        .update(UpdateDocumentInput {
            document_id: created.document.document_id(),
            document: revised,
            rebalance_party: true,
            actor: actor(),
        })
        .await
        .unwrap();
    assert_eq!(engine.balance(first).await, Decimal::ZERO);
    assert_eq!(engine.balance(second).await, dec!(200));
}

#[tokio::test]
async fn test_update_rejects_kind_change_and_missing_document() {
    let engine = Engine::new().await;
    let created = engine
        .create(sale(None, vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]))
        .await;

    let err = engine
        .documents
        .update(UpdateDocumentInput {
            document_id: created.document.document_id(),
            document: purchase(None, vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]),
            rebalance_party: false,
            actor: actor(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "KIND_MISMATCH");

    let missing = DocumentId::new();
    let err = engine
        .documents
        .update(UpdateDocumentInput {
            document_id: missing,
            document: sale(None, vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]),
            rebalance_party: false,
            actor: actor(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DocumentNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_cancelled_document_is_not_editable() {
    let engine = Engine::new().await;
    let created = engine
        .create(sale(None, vec![LineItemInput::new("Notebook", dec!(1), dec!(40))]))
        .await;
    let id = created.document.document_id();
    engine
        .status
        .transition(id, DocumentStatus::Cancelled, actor())
        .await
        .unwrap();

    let err = engine
        .documents
        .update(UpdateDocumentInput {
            document_id: id,
            document: created.to_input().unwrap(),
            rebalance_party: false,
            actor: actor(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DOCUMENT_NOT_EDITABLE");
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_restores_party_and_stock() {
    let engine = Engine::new().await;
    let party = engine.party("Sharma Traders").await;
    let rice = engine.product("Basmati Rice 5kg", dec!(10)).await;
    let created = engine
        .create(sale(
            Some(party),
            vec![LineItemInput::new("Basmati Rice 5kg", dec!(4), dec!(125)).with_product(rice)],
        ))
        .await;
    let id = created.document.document_id();
    assert_eq!(engine.balance(party).await, dec!(500));
    assert_eq!(engine.quantity(rice).await, dec!(6));

    engine.documents.delete(id, actor()).await.unwrap();

    assert_eq!(engine.balance(party).await, Decimal::ZERO);
    assert_eq!(engine.quantity(rice).await, dec!(10));
    assert!(matches!(
        engine.documents.get(id).await,
        Err(EngineError::DocumentNotFound(_))
    ));
    assert_eq!(line_items::Entity::find().count(&engine.db).await.unwrap(), 0);

    let history = engine.documents.history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action().unwrap(), HistoryAction::Deleted);
}

#[tokio::test]
async fn test_delete_purchase_with_sold_stock_fails() {
    let engine = Engine::new().await;
    let oil = engine.product("Sunflower Oil 1L", Decimal::ZERO).await;
    let bought = engine
        .create(purchase(
            None,
            vec![LineItemInput::new("Sunflower Oil 1L", dec!(5), dec!(150)).with_product(oil)],
        ))
        .await;
    engine
        .create(sale(
            None,
            vec![LineItemInput::new("Sunflower Oil 1L", dec!(4), dec!(180)).with_product(oil)],
        ))
        .await;

    let err = engine
        .documents
        .delete(bought.document.document_id(), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");
    assert_eq!(engine.quantity(oil).await, dec!(1));
    assert!(engine.documents.get(bought.document.document_id()).await.is_ok());
}
