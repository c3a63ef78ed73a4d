use super::delta::{DeltaEntry, Prediction};
use super::state::{DialogueState, Role};
use super::validate::validate;
use crate::error::StateInvariantViolation;

/// Merges a prediction into `old` to produce a new, validated state.
///
/// All unchanged items are carried forward; updates advance `confirm` and/or
/// attach results; appends land at the tail in entry order. Any attempt to
/// downgrade `confirm`, overwrite already-set results, or update a position
/// the old state does not have is rejected as a defect rather than silently
/// accepted. The result is re-validated for the same role before it is
/// returned, so a malformed prediction surfaces to the caller instead of
/// corrupting the session.
pub fn compute_new_state(
    old: &DialogueState,
    prediction: &Prediction,
    role: Role,
) -> Result<DialogueState, StateInvariantViolation> {
    let mut items = old.items.clone();

    for entry in prediction.entries() {
        match entry {
            DeltaEntry::Update {
                index,
                confirm,
                results,
            } => {
                // Updates address the old state only; an entry placed after
                // an append must not be able to reach the appended item.
                let len = old.len();
                if *index >= len {
                    return Err(StateInvariantViolation::UpdateOutOfRange { index: *index, len });
                }
                let item = &mut items[*index];

                if let Some(confirm) = confirm {
                    if *confirm < item.confirm {
                        return Err(StateInvariantViolation::ConfirmRegression {
                            index: *index,
                            from: item.confirm,
                            to: *confirm,
                        });
                    }
                    item.confirm = *confirm;
                }

                if let Some(results) = results {
                    if item.results.is_some() {
                        return Err(StateInvariantViolation::ResultsOverwrite { index: *index });
                    }
                    item.results = Some(results.clone());
                }
            }
            DeltaEntry::Append { item } => items.push(item.clone()),
        }
    }

    let new_state = DialogueState::from_items(items);
    validate(&new_state, role)?;
    Ok(new_state)
}
