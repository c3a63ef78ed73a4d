//! The delta encoding must be exact: applying the computed delta to the old
//! state reproduces the new state structurally, for every transition a legal
//! turn can produce.

use parlance::dialogue::{
    ConfirmStatus, DialogueItem, DialogueState, Prediction, ResultSet, Role, compute_new_state,
    compute_prediction, validate,
};
use parlance::program::{Num, Program, Value};

fn weather(confirm: ConfirmStatus) -> DialogueItem {
    DialogueItem::new(
        Program::new("get_current_weather").with_arg(
            "location",
            Value::Entity {
                value: "loc:sf".into(),
                display: Some("san francisco".into()),
            },
        ),
        confirm,
    )
}

fn booking(confirm: ConfirmStatus) -> DialogueItem {
    DialogueItem::new(
        Program::new("book_table").with_arg("guests", Value::Number { value: Num(4.0) }),
        confirm,
    )
}

fn temp_results() -> ResultSet {
    ResultSet::new(vec![serde_json::json!({ "temp": 72 })])
}

/// Single-legal-turn transitions, paired with the role that produces them.
fn reachable_transitions() -> Vec<(DialogueState, DialogueState, Role)> {
    vec![
        // First user turn: a new accepted command appears.
        (
            DialogueState::new(),
            DialogueState::from_items(vec![weather(ConfirmStatus::Accepted)]),
            Role::User,
        ),
        // User confirms a pending action.
        (
            DialogueState::from_items(vec![booking(ConfirmStatus::Accepted)]),
            DialogueState::from_items(vec![booking(ConfirmStatus::Confirmed)]),
            Role::User,
        ),
        // Execution attaches results to a confirmed item.
        (
            DialogueState::from_items(vec![weather(ConfirmStatus::Confirmed)]),
            DialogueState::from_items(vec![
                weather(ConfirmStatus::Confirmed).with_results(temp_results()),
            ]),
            Role::Agent,
        ),
        // Agent proposes a follow-up after an executed command.
        (
            DialogueState::from_items(vec![
                weather(ConfirmStatus::Confirmed).with_results(temp_results()),
            ]),
            DialogueState::from_items(vec![
                weather(ConfirmStatus::Confirmed).with_results(temp_results()),
                booking(ConfirmStatus::Proposed),
            ]),
            Role::Agent,
        ),
        // Upgrade and append in the same turn.
        (
            DialogueState::from_items(vec![
                weather(ConfirmStatus::Confirmed).with_results(temp_results()),
                booking(ConfirmStatus::Accepted),
            ]),
            DialogueState::from_items(vec![
                weather(ConfirmStatus::Confirmed).with_results(temp_results()),
                booking(ConfirmStatus::Confirmed),
                weather(ConfirmStatus::Accepted),
            ]),
            Role::User,
        ),
    ]
}

#[test]
fn apply_of_diff_reproduces_the_new_state() {
    for (old, new, role) in reachable_transitions() {
        let prediction = compute_prediction(&old, &new, role);
        let rebuilt = compute_new_state(&old, &prediction, role).unwrap();
        assert_eq!(rebuilt, new, "round trip failed for role {role:?}");
    }
}

#[test]
fn carried_forward_results_survive_the_round_trip() {
    let old = DialogueState::from_items(vec![
        weather(ConfirmStatus::Confirmed).with_results(temp_results()),
    ]);
    let new = DialogueState::from_items(vec![
        weather(ConfirmStatus::Confirmed).with_results(temp_results()),
        booking(ConfirmStatus::Accepted),
    ]);
    let prediction = compute_prediction(&old, &new, Role::User);
    let rebuilt = compute_new_state(&old, &prediction, Role::User).unwrap();
    assert_eq!(rebuilt.items[0].results, Some(temp_results()));
}

#[test]
fn noop_diff_and_noop_apply_are_identities() {
    for (state, _, role) in reachable_transitions() {
        let prediction = compute_prediction(&state, &state, role);
        assert!(prediction.is_empty());
        // Identity only holds where the state is itself valid for the role;
        // mid-turn inputs (confirmed but unexecuted, for the agent) are
        // rejected like any other invalid result.
        if validate(&state, role).is_ok() {
            let unchanged = compute_new_state(&state, &Prediction::empty(), role).unwrap();
            assert_eq!(unchanged, state);
        }
    }
}

#[test]
fn program_change_at_an_existing_position_is_not_a_delta() {
    // Replacing the program at a held position is not a legal turn; the
    // differ has no entry form for it and must leave the item alone rather
    // than guess at an edit.
    let old = DialogueState::from_items(vec![weather(ConfirmStatus::Accepted)]);
    let new = DialogueState::from_items(vec![booking(ConfirmStatus::Accepted)]);

    let prediction = compute_prediction(&old, &new, Role::User);
    assert!(prediction.is_empty());

    let rebuilt = compute_new_state(&old, &prediction, Role::User).unwrap();
    assert_eq!(rebuilt, old);
    assert_ne!(rebuilt, new);
}

#[test]
fn confirm_is_non_decreasing_across_applied_sequences() {
    // Drive one item through its whole lifecycle, alternating the role that
    // owns each step, and watch confirm.
    let steps = [
        (
            DialogueState::from_items(vec![booking(ConfirmStatus::Proposed)]),
            Role::Agent,
        ),
        (
            DialogueState::from_items(vec![booking(ConfirmStatus::Accepted)]),
            Role::User,
        ),
        (
            DialogueState::from_items(vec![booking(ConfirmStatus::Confirmed)]),
            Role::User,
        ),
        (
            DialogueState::from_items(vec![
                booking(ConfirmStatus::Confirmed).with_results(temp_results()),
            ]),
            Role::Agent,
        ),
    ];

    let mut state = DialogueState::new();
    let mut last_confirm = None;
    for (target, role) in steps {
        let prediction = compute_prediction(&state, &target, role);
        state = compute_new_state(&state, &prediction, role).unwrap();
        let confirm = state.items[0].confirm;
        if let Some(last) = last_confirm {
            assert!(confirm >= last, "confirm regressed from {last:?} to {confirm:?}");
        }
        last_confirm = Some(confirm);
    }
}

#[test]
fn apply_never_returns_a_state_that_fails_validation() {
    for (old, new, role) in reachable_transitions() {
        let prediction = compute_prediction(&old, &new, role);
        match compute_new_state(&old, &prediction, role) {
            Ok(state) => assert!(validate(&state, role).is_ok()),
            Err(_) => {} // an error is the only permitted alternative
        }
    }
}
