//! Property-based tests for the status state machine.

use proptest::prelude::*;

use crate::document::{DocumentKind, DocumentStatus};
use crate::workflow::error::StatusError;
use crate::workflow::service::StatusMachine;

fn arb_kind() -> impl Strategy<Value = DocumentKind> {
    prop::sample::select(DocumentKind::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = DocumentStatus> {
    prop::sample::select(DocumentStatus::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every successor in a kind's table is a label the kind may use.
    #[test]
    fn prop_successors_within_kind_subset(kind in arb_kind(), from in arb_status()) {
        let allowed = StatusMachine::allowed_statuses(kind);
        for to in StatusMachine::successors(kind, from) {
            prop_assert!(allowed.contains(to), "{kind}: {from} -> {to}");
        }
    }

    /// Terminal states never have successors.
    #[test]
    fn prop_terminal_states_are_final(kind in arb_kind(), from in arb_status()) {
        if from.is_terminal() {
            prop_assert!(StatusMachine::successors(kind, from).is_empty());
        }
    }

    /// Manual transitions never reach a reserved status.
    #[test]
    fn prop_manual_never_reaches_reserved(
        kind in arb_kind(),
        from in arb_status(),
        to in arb_status(),
    ) {
        match StatusMachine::validate_manual(kind, from, to) {
            Ok(effect) => {
                prop_assert!(!StatusMachine::is_reserved(effect.to));
                prop_assert!(StatusMachine::is_valid_transition(kind, from, to));
            }
            Err(StatusError::ReservedTransition(status)) => {
                prop_assert!(StatusMachine::is_reserved(status));
            }
            Err(_) => prop_assert!(!StatusMachine::is_valid_transition(kind, from, to)
                || StatusMachine::is_reserved(to)),
        }
    }

    /// No status transitions to itself.
    #[test]
    fn prop_no_self_transitions(kind in arb_kind(), status in arb_status()) {
        prop_assert!(!StatusMachine::is_valid_transition(kind, status, status));
    }

    /// Only a transition into returned reverses the balance.
    #[test]
    fn prop_only_returned_reverses(kind in arb_kind(), from in arb_status(), to in arb_status()) {
        if let Ok(effect) = StatusMachine::validate_manual(kind, from, to) {
            prop_assert_eq!(effect.reverse_balance, to == DocumentStatus::Returned);
        }
    }
}
