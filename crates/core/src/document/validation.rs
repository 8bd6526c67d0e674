//! Document input validation and total computation.

use rust_decimal::Decimal;

use crate::amount::{DocumentTotals, LineAmounts};
use crate::document::error::DocumentError;
use crate::document::types::{DocumentInput, KindDetails, LineItemInput};
use crate::stock::StockLine;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A validated line with its computed amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedLine {
    /// The line as entered.
    pub input: LineItemInput,
    /// Computed amounts.
    pub amounts: LineAmounts,
    /// Display position.
    pub position: i32,
}

/// A validated document ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    /// Lines in display order.
    pub lines: Vec<PreparedLine>,
    /// Header totals.
    pub totals: DocumentTotals,
}

/// Stateless document rules.
pub struct DocumentService;

impl DocumentService {
    /// Validates a document request.
    ///
    /// Runs before any write so a rejected request leaves no trace.
    pub fn validate(input: &DocumentInput) -> Result<(), DocumentError> {
        if input.lines.is_empty() {
            return Err(DocumentError::NoLines);
        }

        for (index, line) in input.lines.iter().enumerate() {
            Self::validate_line(index, line)?;
        }

        if input.document_discount < Decimal::ZERO {
            return Err(DocumentError::NegativeDocumentDiscount(
                input.document_discount,
            ));
        }

        if let Some(due_date) = input.details.due_date() {
            if due_date < input.date {
                return Err(DocumentError::DueDateBeforeDocumentDate {
                    date: input.date,
                    due_date,
                });
            }
        }

        if let KindDetails::Expense { category } = &input.details {
            if category.trim().is_empty() {
                return Err(DocumentError::ExpenseCategoryRequired);
            }
        }

        Ok(())
    }

    fn validate_line(index: usize, line: &LineItemInput) -> Result<(), DocumentError> {
        if line.name.trim().is_empty() {
            return Err(DocumentError::EmptyLineName { line: index });
        }
        if line.quantity <= Decimal::ZERO {
            return Err(DocumentError::NonPositiveQuantity {
                line: index,
                quantity: line.quantity,
            });
        }
        if line.unit_price < Decimal::ZERO {
            return Err(DocumentError::NegativeUnitPrice {
                line: index,
                unit_price: line.unit_price,
            });
        }
        for (field, value) in [
            ("discount_percent", line.discount_percent),
            ("tax_percent", line.tax_percent),
        ] {
            if value < Decimal::ZERO || value > HUNDRED {
                return Err(DocumentError::PercentOutOfRange {
                    line: index,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Validates the request and computes line amounts and header totals.
    pub fn prepare(input: &DocumentInput) -> Result<PreparedDocument, DocumentError> {
        Self::validate(input)?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (index, (position, line)) in (0i32..).zip(&input.lines).enumerate() {
            let amounts = LineAmounts::compute(
                line.quantity,
                line.unit_price,
                line.discount_percent,
                line.tax_percent,
            )
            .ok_or(DocumentError::LineAmountOverflow { line: index })?;
            lines.push(PreparedLine {
                amounts,
                input: line.clone(),
                position,
            });
        }

        let amounts: Vec<LineAmounts> = lines.iter().map(|l| l.amounts).collect();
        let totals = DocumentTotals::from_lines(&amounts, input.document_discount)
            .ok_or(DocumentError::TotalOverflow)?;
        if totals.total < Decimal::ZERO {
            return Err(DocumentError::DiscountExceedsTotal {
                discount: input.document_discount,
                available: totals.total + input.document_discount,
            });
        }

        Ok(PreparedDocument { lines, totals })
    }

    /// Stock quantities requested by lines linked to a product.
    #[must_use]
    pub fn stock_lines(lines: &[LineItemInput]) -> Vec<StockLine> {
        lines
            .iter()
            .filter_map(|l| {
                l.product_id.map(|product_id| StockLine {
                    product_id,
                    quantity: l.quantity,
                })
            })
            .collect()
    }
}
