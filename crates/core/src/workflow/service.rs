//! Document status state machine.
//!
//! Every kind shares one label set but uses its own subset and table:
//!
//! - Invoices: draft → unpaid; unpaid/partial/overdue → paid, overdue,
//!   cancelled, returned; paid → returned
//! - Expenses: as invoices without returned
//! - Estimates: draft → sent; draft/sent → accepted, rejected, expired,
//!   cancelled; any open estimate → converted
//! - Credit notes: draft → unpaid; unpaid → paid, cancelled
//!
//! `paid` and `converted` are reserved for the payment and conversion paths.
//! `partial` is only entered when a paid document loses part of its
//! settlement, either by a removed payment or by a raised total.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::document::{DocumentKind, DocumentStatus};
use crate::workflow::error::StatusError;
use crate::workflow::types::{StatusEffect, TransitionCause};

use crate::document::DocumentStatus::{
    Accepted, Cancelled, Converted, Draft, Expired, Overdue, Paid, Partial, Rejected, Returned,
    Sent, Unpaid,
};

const INVOICE_STATUSES: &[DocumentStatus] =
    &[Draft, Unpaid, Partial, Overdue, Paid, Cancelled, Returned];
const EXPENSE_STATUSES: &[DocumentStatus] = &[Draft, Unpaid, Partial, Overdue, Paid, Cancelled];
const ESTIMATE_STATUSES: &[DocumentStatus] =
    &[Draft, Sent, Accepted, Rejected, Expired, Cancelled, Converted];
const CREDIT_NOTE_STATUSES: &[DocumentStatus] = &[Draft, Unpaid, Paid, Cancelled];

/// Stateless status rules.
pub struct StatusMachine;

impl StatusMachine {
    /// Labels the kind may use.
    #[must_use]
    pub fn allowed_statuses(kind: DocumentKind) -> &'static [DocumentStatus] {
        match kind {
            DocumentKind::SaleInvoice | DocumentKind::PurchaseInvoice => INVOICE_STATUSES,
            DocumentKind::Expense => EXPENSE_STATUSES,
            DocumentKind::Estimate => ESTIMATE_STATUSES,
            DocumentKind::CreditNote => CREDIT_NOTE_STATUSES,
        }
    }

    /// Statuses reachable from `from`, reserved ones included.
    #[must_use]
    pub fn successors(kind: DocumentKind, from: DocumentStatus) -> &'static [DocumentStatus] {
        match (kind, from) {
            (DocumentKind::SaleInvoice | DocumentKind::PurchaseInvoice, Draft)
            | (DocumentKind::Expense | DocumentKind::CreditNote, Draft) => &[Unpaid],
            (DocumentKind::SaleInvoice | DocumentKind::PurchaseInvoice, Unpaid | Partial) => {
                &[Paid, Overdue, Cancelled, Returned]
            }
            (DocumentKind::SaleInvoice | DocumentKind::PurchaseInvoice, Overdue) => {
                &[Paid, Cancelled, Returned]
            }
            (DocumentKind::SaleInvoice | DocumentKind::PurchaseInvoice, Paid) => &[Returned],
            (DocumentKind::Expense, Unpaid | Partial) => &[Paid, Overdue, Cancelled],
            (DocumentKind::Expense, Overdue) => &[Paid, Cancelled],
            (DocumentKind::Estimate, Draft) => {
                &[Sent, Accepted, Rejected, Expired, Cancelled, Converted]
            }
            (DocumentKind::Estimate, Sent) => &[Accepted, Rejected, Expired, Cancelled, Converted],
            (DocumentKind::Estimate, Accepted) => &[Converted],
            (DocumentKind::CreditNote, Unpaid) => &[Paid, Cancelled],
            _ => &[],
        }
    }

    /// Returns true if `from → to` is in the kind's table.
    #[must_use]
    pub fn is_valid_transition(kind: DocumentKind, from: DocumentStatus, to: DocumentStatus) -> bool {
        Self::successors(kind, from).contains(&to)
    }

    /// Returns true for statuses only their own operation may set.
    #[must_use]
    pub fn is_reserved(status: DocumentStatus) -> bool {
        matches!(status, Paid | Converted)
    }

    fn check(
        kind: DocumentKind,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<(), StatusError> {
        if !Self::allowed_statuses(kind).contains(&to) {
            return Err(StatusError::NotAllowedForKind { kind, status: to });
        }
        if !Self::is_valid_transition(kind, from, to) {
            return Err(StatusError::InvalidTransition { from, to });
        }
        Ok(())
    }

    /// Validates a user-requested transition.
    pub fn validate_manual(
        kind: DocumentKind,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<StatusEffect, StatusError> {
        if !Self::allowed_statuses(kind).contains(&to) {
            return Err(StatusError::NotAllowedForKind { kind, status: to });
        }
        if Self::is_reserved(to) {
            return Err(StatusError::ReservedTransition(to));
        }
        Self::check(kind, from, to)?;

        Ok(StatusEffect {
            from,
            to,
            cause: TransitionCause::Manual,
            reverse_balance: to == Returned,
        })
    }

    /// Validates the transition into `converted`.
    pub fn validate_conversion(
        kind: DocumentKind,
        from: DocumentStatus,
    ) -> Result<StatusEffect, StatusError> {
        Self::check(kind, from, Converted)?;
        Ok(StatusEffect {
            from,
            to: Converted,
            cause: TransitionCause::Conversion,
            reverse_balance: false,
        })
    }

    /// Status a new document starts in.
    #[must_use]
    pub fn initial_status(kind: DocumentKind, as_draft: bool) -> DocumentStatus {
        if as_draft { Draft } else { kind.open_status() }
    }

    /// Rejects edits to closed documents.
    pub fn ensure_editable(status: DocumentStatus) -> Result<(), StatusError> {
        if status.is_terminal() {
            return Err(StatusError::NotEditable(status));
        }
        Ok(())
    }

    /// Status change caused by a recorded payment, if any.
    ///
    /// Only a fully settled open document moves; a partial payment leaves
    /// the status as it was.
    #[must_use]
    pub fn after_payment(
        kind: DocumentKind,
        status: DocumentStatus,
        settled: bool,
    ) -> Option<StatusEffect> {
        (settled && Self::is_valid_transition(kind, status, Paid)).then_some(StatusEffect {
            from: status,
            to: Paid,
            cause: TransitionCause::Payment,
            reverse_balance: false,
        })
    }

    /// Status change caused by a reversed payment, if any.
    ///
    /// A paid document that owes money again falls back to `partial` while
    /// some payment remains, otherwise to its open status. A `partial`
    /// document whose last payment is gone also returns to its open status.
    #[must_use]
    pub fn after_payment_reversal(
        kind: DocumentKind,
        status: DocumentStatus,
        amount_paid: Decimal,
        settled: bool,
    ) -> Option<StatusEffect> {
        if settled || !matches!(status, Paid | Partial) {
            return None;
        }
        let to = Self::reopened_status(kind, amount_paid);
        (to != status).then_some(StatusEffect {
            from: status,
            to,
            cause: TransitionCause::Payment,
            reverse_balance: false,
        })
    }

    /// Status a paid document returns to once it owes money again.
    #[must_use]
    pub fn reopened_status(kind: DocumentKind, amount_paid: Decimal) -> DocumentStatus {
        if amount_paid > Decimal::ZERO && Self::allowed_statuses(kind).contains(&Partial) {
            Partial
        } else {
            kind.open_status()
        }
    }

    /// Status change caused by editing a document's total.
    ///
    /// An open document the new total settles becomes `paid`; a paid one
    /// that now owes money reopens.
    #[must_use]
    pub fn after_revision(
        kind: DocumentKind,
        status: DocumentStatus,
        amount_paid: Decimal,
        settled: bool,
    ) -> Option<StatusEffect> {
        Self::after_payment(kind, status, settled)
            .or_else(|| Self::after_payment_reversal(kind, status, amount_paid, settled))
            .map(|effect| StatusEffect {
                cause: TransitionCause::Revision,
                ..effect
            })
    }

    /// Returns true if the overdue sweep should move the document.
    #[must_use]
    pub fn is_overdue(
        kind: DocumentKind,
        status: DocumentStatus,
        due_date: Option<NaiveDate>,
        as_of: NaiveDate,
    ) -> bool {
        kind.is_invoice()
            && matches!(status, Unpaid | Partial)
            && due_date.is_some_and(|due| due < as_of)
    }

    /// The sweep transition for an overdue document.
    #[must_use]
    pub fn overdue_effect(from: DocumentStatus) -> StatusEffect {
        StatusEffect {
            from,
            to: Overdue,
            cause: TransitionCause::Sweep,
            reverse_balance: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DocumentKind::SaleInvoice, Draft, Unpaid)]
    #[case(DocumentKind::SaleInvoice, Unpaid, Cancelled)]
    #[case(DocumentKind::PurchaseInvoice, Overdue, Returned)]
    #[case(DocumentKind::SaleInvoice, Paid, Returned)]
    #[case(DocumentKind::Expense, Unpaid, Overdue)]
    #[case(DocumentKind::Estimate, Draft, Sent)]
    #[case(DocumentKind::Estimate, Sent, Accepted)]
    #[case(DocumentKind::Estimate, Draft, Expired)]
    #[case(DocumentKind::CreditNote, Unpaid, Cancelled)]
    fn test_manual_transitions_allowed(
        #[case] kind: DocumentKind,
        #[case] from: DocumentStatus,
        #[case] to: DocumentStatus,
    ) {
        let effect = StatusMachine::validate_manual(kind, from, to).unwrap();
        assert_eq!(effect.to, to);
        assert_eq!(effect.cause, TransitionCause::Manual);
    }

    #[test]
    fn test_returned_reverses_balance() {
        let effect =
            StatusMachine::validate_manual(DocumentKind::SaleInvoice, Unpaid, Returned).unwrap();
        assert!(effect.reverse_balance);
        let effect =
            StatusMachine::validate_manual(DocumentKind::SaleInvoice, Unpaid, Cancelled).unwrap();
        assert!(!effect.reverse_balance);
    }

    #[test]
    fn test_reserved_targets() {
        assert_eq!(
            StatusMachine::validate_manual(DocumentKind::SaleInvoice, Unpaid, Paid),
            Err(StatusError::ReservedTransition(Paid))
        );
        assert_eq!(
            StatusMachine::validate_manual(DocumentKind::Estimate, Accepted, Converted),
            Err(StatusError::ReservedTransition(Converted))
        );
    }

    #[test]
    fn test_kind_subsets() {
        assert_eq!(
            StatusMachine::validate_manual(DocumentKind::Expense, Unpaid, Returned),
            Err(StatusError::NotAllowedForKind {
                kind: DocumentKind::Expense,
                status: Returned,
            })
        );
        assert!(matches!(
            StatusMachine::validate_manual(DocumentKind::SaleInvoice, Unpaid, Sent),
            Err(StatusError::NotAllowedForKind { .. })
        ));
    }

    #[test]
    fn test_terminal_states_cannot_move() {
        assert_eq!(
            StatusMachine::validate_manual(DocumentKind::SaleInvoice, Cancelled, Unpaid),
            Err(StatusError::InvalidTransition {
                from: Cancelled,
                to: Unpaid,
            })
        );
        assert!(StatusMachine::validate_manual(DocumentKind::Estimate, Rejected, Accepted).is_err());
    }

    #[test]
    fn test_conversion_from_open_estimates() {
        for from in [Draft, Sent, Accepted] {
            assert!(StatusMachine::validate_conversion(DocumentKind::Estimate, from).is_ok());
        }
        assert!(StatusMachine::validate_conversion(DocumentKind::Estimate, Rejected).is_err());
        assert!(StatusMachine::validate_conversion(DocumentKind::Estimate, Converted).is_err());
        assert!(StatusMachine::validate_conversion(DocumentKind::SaleInvoice, Unpaid).is_err());
    }

    #[test]
    fn test_after_payment() {
        assert_eq!(
            StatusMachine::after_payment(DocumentKind::SaleInvoice, Unpaid, true).map(|e| e.to),
            Some(Paid)
        );
        assert_eq!(
            StatusMachine::after_payment(DocumentKind::SaleInvoice, Unpaid, false),
            None
        );
        assert_eq!(
            StatusMachine::after_payment(DocumentKind::SaleInvoice, Paid, true),
            None
        );
    }

    #[test]
    fn test_after_payment_reversal() {
        let effect = StatusMachine::after_payment_reversal(
            DocumentKind::PurchaseInvoice,
            Paid,
            Decimal::ZERO,
            false,
        )
        .unwrap();
        assert_eq!(effect.to, Unpaid);
        assert_eq!(
            StatusMachine::after_payment_reversal(
                DocumentKind::PurchaseInvoice,
                Unpaid,
                Decimal::ZERO,
                false
            ),
            None
        );
        assert_eq!(
            StatusMachine::after_payment_reversal(
                DocumentKind::PurchaseInvoice,
                Paid,
                Decimal::ONE,
                true
            ),
            None
        );
    }

    #[test]
    fn test_partial_without_payments_reopens() {
        let effect = StatusMachine::after_payment_reversal(
            DocumentKind::SaleInvoice,
            Partial,
            Decimal::ZERO,
            false,
        )
        .unwrap();
        assert_eq!((effect.from, effect.to), (Partial, Unpaid));
        assert_eq!(
            StatusMachine::after_payment_reversal(
                DocumentKind::SaleInvoice,
                Partial,
                Decimal::ONE,
                false
            ),
            None
        );
    }

    #[rstest]
    #[case(DocumentKind::SaleInvoice, Decimal::ONE, Partial)]
    #[case(DocumentKind::SaleInvoice, Decimal::ZERO, Unpaid)]
    #[case(DocumentKind::Expense, Decimal::ONE, Partial)]
    // credit notes have no partial label
    #[case(DocumentKind::CreditNote, Decimal::ONE, Unpaid)]
    fn test_reopened_status(
        #[case] kind: DocumentKind,
        #[case] amount_paid: Decimal,
        #[case] expected: DocumentStatus,
    ) {
        assert_eq!(StatusMachine::reopened_status(kind, amount_paid), expected);
        let effect = StatusMachine::after_payment_reversal(kind, Paid, amount_paid, false).unwrap();
        assert_eq!(effect.to, expected);
    }

    #[test]
    fn test_after_revision() {
        let paid_down =
            StatusMachine::after_revision(DocumentKind::SaleInvoice, Unpaid, Decimal::ONE, true)
                .unwrap();
        assert_eq!((paid_down.from, paid_down.to), (Unpaid, Paid));
        assert_eq!(paid_down.cause, TransitionCause::Revision);

        let reopened =
            StatusMachine::after_revision(DocumentKind::SaleInvoice, Paid, Decimal::ONE, false)
                .unwrap();
        assert_eq!((reopened.from, reopened.to), (Paid, Partial));

        assert_eq!(
            StatusMachine::after_revision(DocumentKind::SaleInvoice, Draft, Decimal::ONE, true),
            None
        );
        assert_eq!(
            StatusMachine::after_revision(DocumentKind::SaleInvoice, Unpaid, Decimal::ONE, false),
            None
        );
    }

    #[test]
    fn test_is_overdue() {
        let due = NaiveDate::from_ymd_opt(2026, 10, 1);
        let as_of = NaiveDate::from_ymd_opt(2026, 10, 2).unwrap();
        assert!(StatusMachine::is_overdue(DocumentKind::SaleInvoice, Unpaid, due, as_of));
        assert!(!StatusMachine::is_overdue(DocumentKind::SaleInvoice, Paid, due, as_of));
        assert!(!StatusMachine::is_overdue(DocumentKind::SaleInvoice, Unpaid, None, as_of));
        assert!(!StatusMachine::is_overdue(DocumentKind::Estimate, Sent, due, as_of));
        let on_due = due.unwrap();
        assert!(!StatusMachine::is_overdue(DocumentKind::SaleInvoice, Unpaid, due, on_due));
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(StatusMachine::initial_status(DocumentKind::SaleInvoice, false), Unpaid);
        assert_eq!(StatusMachine::initial_status(DocumentKind::Estimate, false), Sent);
        assert_eq!(StatusMachine::initial_status(DocumentKind::Expense, true), Draft);
    }

    #[test]
    fn test_ensure_editable() {
        assert!(StatusMachine::ensure_editable(Paid).is_ok());
        assert_eq!(
            StatusMachine::ensure_editable(Converted),
            Err(StatusError::NotEditable(Converted))
        );
    }
}
