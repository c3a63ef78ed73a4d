//! The weather walkthrough: an accepted query is confirmed, executed, and
//! validated the way a live turn would see it.

use parlance::dialogue::{
    ConfirmStatus, DeltaEntry, DialogueItem, DialogueState, Prediction, ResultSet, Role,
    compute_new_state, validate,
};
use parlance::error::StateInvariantViolation;
use parlance::program::Program;

#[test]
fn accepted_weather_query_confirms_and_executes() {
    let old = DialogueState::from_items(vec![DialogueItem::new(
        Program::new("get_current_weather"),
        ConfirmStatus::Accepted,
    )]);

    let mut prediction = Prediction::empty();
    prediction.push(DeltaEntry::Update {
        index: 0,
        confirm: Some(ConfirmStatus::Confirmed),
        results: Some(ResultSet::new(vec![serde_json::json!({ "temp": 72 })])),
    });

    let new = compute_new_state(&old, &prediction, Role::Agent).unwrap();
    assert_eq!(
        new,
        DialogueState::from_items(vec![
            DialogueItem::new(Program::new("get_current_weather"), ConfirmStatus::Confirmed)
                .with_results(ResultSet::new(vec![serde_json::json!({ "temp": 72 })])),
        ])
    );
    assert!(validate(&new, Role::Agent).is_ok());
}

#[test]
fn proposed_weather_query_is_invalid_for_the_user() {
    let state = DialogueState::from_items(vec![DialogueItem::new(
        Program::new("get_current_weather"),
        ConfirmStatus::Proposed,
    )]);
    assert_eq!(
        validate(&state, Role::User),
        Err(StateInvariantViolation::ProposedItem { index: 0 })
    );
}
