//! Stock availability and movement rules.
//!
//! Stock only moves for sale invoices (outbound) and purchase invoices
//! (inbound). Service products are exempt from every check. Any movement
//! that would take a product-kind item below zero is rejected, and an
//! outbound reservation of an expired product is a hard error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::ErrorKind;
use tallybook_shared::types::ProductId;
use thiserror::Error;

/// Direction in which a document moves stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockDirection {
    /// Goods leave the shop (sale invoice).
    Outbound,
    /// Goods arrive (purchase invoice).
    Inbound,
}

impl StockDirection {
    /// Signed quantity change applied when a document is committed.
    #[must_use]
    pub fn reserve_delta(self, quantity: Decimal) -> Decimal {
        match self {
            Self::Outbound => -quantity,
            Self::Inbound => quantity,
        }
    }

    /// Signed quantity change applied when a document's lines are undone.
    #[must_use]
    pub fn release_delta(self, quantity: Decimal) -> Decimal {
        -self.reserve_delta(quantity)
    }
}

/// Stock-relevant view of a product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStock {
    /// Product ID.
    pub id: ProductId,
    /// Product name, used in error messages.
    pub name: String,
    /// Services are never stock-checked.
    pub is_service: bool,
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Optional expiry date.
    pub expiry_date: Option<NaiveDate>,
}

/// Quantity of one product requested by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLine {
    /// Product ID.
    pub product_id: ProductId,
    /// Requested quantity.
    pub quantity: Decimal,
}

/// Errors raised while reserving or releasing stock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Not enough quantity on hand.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product ID.
        product_id: ProductId,
        /// Product name.
        product: String,
        /// Quantity on hand.
        available: Decimal,
        /// Quantity the movement needs.
        requested: Decimal,
    },

    /// The product expired before today.
    #[error("Product {product} expired on {expiry}")]
    ExpiredProduct {
        /// Product ID.
        product_id: ProductId,
        /// Product name.
        product: String,
        /// Expiry date.
        expiry: NaiveDate,
    },
}

impl StockError {
    /// Returns the error code for display layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ExpiredProduct { .. } => "EXPIRED_PRODUCT",
        }
    }

    /// Stock errors are always validation errors.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Stateless stock rules.
pub struct StockService;

impl StockService {
    /// Sums requested quantities per product, in product order.
    ///
    /// Two lines for the same product must be checked against the combined
    /// quantity, otherwise each would pass on its own.
    #[must_use]
    pub fn aggregate(lines: &[StockLine]) -> Vec<StockLine> {
        let mut totals: BTreeMap<ProductId, Decimal> = BTreeMap::new();
        for line in lines {
            *totals.entry(line.product_id).or_insert(Decimal::ZERO) += line.quantity;
        }
        totals
            .into_iter()
            .map(|(product_id, quantity)| StockLine {
                product_id,
                quantity,
            })
            .collect()
    }

    /// Validates a signed movement against a product and returns the delta to apply.
    ///
    /// `expiry_check` is the date the product must not have expired before;
    /// it is only passed for outbound reservations.
    pub fn check_movement(
        product: &ProductStock,
        delta: Decimal,
        expiry_check: Option<NaiveDate>,
    ) -> Result<Decimal, StockError> {
        if product.is_service {
            return Ok(Decimal::ZERO);
        }

        if delta < Decimal::ZERO {
            if let (Some(today), Some(expiry)) = (expiry_check, product.expiry_date) {
                if expiry < today {
                    return Err(StockError::ExpiredProduct {
                        product_id: product.id,
                        product: product.name.clone(),
                        expiry,
                    });
                }
            }

            let requested = -delta;
            if product.quantity < requested {
                return Err(StockError::InsufficientStock {
                    product_id: product.id,
                    product: product.name.clone(),
                    available: product.quantity,
                    requested,
                });
            }
        }

        Ok(delta)
    }

    /// Checks and returns the delta for committing `quantity` of a product.
    pub fn reserve(
        direction: StockDirection,
        product: &ProductStock,
        quantity: Decimal,
        today: NaiveDate,
    ) -> Result<Decimal, StockError> {
        let expiry_check = matches!(direction, StockDirection::Outbound).then_some(today);
        Self::check_movement(product, direction.reserve_delta(quantity), expiry_check)
    }

    /// Checks and returns the delta for undoing `quantity` of a product.
    pub fn release(
        direction: StockDirection,
        product: &ProductStock,
        quantity: Decimal,
    ) -> Result<Decimal, StockError> {
        Self::check_movement(product, direction.release_delta(quantity), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(quantity: Decimal) -> ProductStock {
        ProductStock {
            id: ProductId::new(),
            name: "Basmati Rice 5kg".to_string(),
            is_service: false,
            quantity,
            expiry_date: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_outbound_reserve_decrements() {
        let delta = StockService::reserve(StockDirection::Outbound, &product(dec!(10)), dec!(4), today());
        assert_eq!(delta, Ok(dec!(-4)));
    }

    #[test]
    fn test_outbound_reserve_insufficient() {
        let p = product(dec!(2));
        let err = StockService::reserve(StockDirection::Outbound, &p, dec!(5), today()).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                product_id: p.id,
                product: p.name.clone(),
                available: dec!(2),
                requested: dec!(5),
            }
        );
        assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Basmati Rice 5kg: available 2, requested 5"
        );
    }

    #[test]
    fn test_exact_quantity_is_allowed() {
        let delta = StockService::reserve(StockDirection::Outbound, &product(dec!(5)), dec!(5), today());
        assert_eq!(delta, Ok(dec!(-5)));
    }

    #[test]
    fn test_expired_product_rejected() {
        let mut p = product(dec!(100));
        p.expiry_date = NaiveDate::from_ymd_opt(2026, 10, 16);
        let err = StockService::reserve(StockDirection::Outbound, &p, dec!(1), today()).unwrap_err();
        assert!(matches!(err, StockError::ExpiredProduct { .. }));
    }

    #[test]
    fn test_expiring_today_is_allowed() {
        let mut p = product(dec!(100));
        p.expiry_date = Some(today());
        assert!(StockService::reserve(StockDirection::Outbound, &p, dec!(1), today()).is_ok());
    }

    #[test]
    fn test_inbound_reserve_skips_checks() {
        let mut p = product(dec!(0));
        p.expiry_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        let delta = StockService::reserve(StockDirection::Inbound, &p, dec!(12), today());
        assert_eq!(delta, Ok(dec!(12)));
    }

    #[test]
    fn test_release_inbound_cannot_go_negative() {
        let p = product(dec!(3));
        let err = StockService::release(StockDirection::Inbound, &p, dec!(5)).unwrap_err();
        assert!(matches!(
            err,
            StockError::InsufficientStock { available, requested, .. }
                if available == dec!(3) && requested == dec!(5)
        ));
    }

    #[test]
    fn test_release_outbound_ignores_expiry() {
        let mut p = product(dec!(0));
        p.expiry_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert_eq!(StockService::release(StockDirection::Outbound, &p, dec!(2)), Ok(dec!(2)));
    }

    #[test]
    fn test_services_are_exempt() {
        let mut p = product(dec!(0));
        p.is_service = true;
        assert_eq!(
            StockService::reserve(StockDirection::Outbound, &p, dec!(50), today()),
            Ok(Decimal::ZERO)
        );
    }

    #[test]
    fn test_aggregate_sums_same_product() {
        let a = ProductId::new();
        let b = ProductId::new();
        let lines = [
            StockLine { product_id: a, quantity: dec!(2) },
            StockLine { product_id: b, quantity: dec!(1) },
            StockLine { product_id: a, quantity: dec!(3) },
        ];
        let totals = StockService::aggregate(&lines);
        assert_eq!(totals.len(), 2);
        let a_total = totals.iter().find(|l| l.product_id == a).unwrap();
        assert_eq!(a_total.quantity, dec!(5));
    }
}
