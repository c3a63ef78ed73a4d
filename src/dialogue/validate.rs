use super::state::{ConfirmStatus, DialogueState, Role};
use crate::error::StateInvariantViolation;

/// Checks the role-dependent confirmation invariants of a state.
///
/// - `Role::User`: a user-visible state reflects only items the system has at
///   least tentatively accepted, so no item may still be `Proposed`.
/// - `Role::Agent`: the agent only reasons about resolved outcomes, so no
///   `Confirmed` item may be missing its results.
///
/// Purely structural: no history, no side effects.
pub fn validate(state: &DialogueState, role: Role) -> Result<(), StateInvariantViolation> {
    for (index, item) in state.iter().enumerate() {
        match role {
            Role::User => {
                if item.confirm == ConfirmStatus::Proposed {
                    return Err(StateInvariantViolation::ProposedItem { index });
                }
            }
            Role::Agent => {
                if item.needs_execution() {
                    return Err(StateInvariantViolation::UnexecutedConfirmed { index });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::DialogueItem;
    use crate::program::Program;

    fn item(confirm: ConfirmStatus) -> DialogueItem {
        DialogueItem::new(Program::new("get_current_weather"), confirm)
    }

    #[test]
    fn empty_state_is_valid_for_both_roles() {
        let state = DialogueState::new();
        assert!(validate(&state, Role::User).is_ok());
        assert!(validate(&state, Role::Agent).is_ok());
    }

    #[test]
    fn user_state_rejects_proposed_items() {
        let state = DialogueState::from_items(vec![
            item(ConfirmStatus::Accepted),
            item(ConfirmStatus::Proposed),
        ]);
        assert_eq!(
            validate(&state, Role::User),
            Err(StateInvariantViolation::ProposedItem { index: 1 })
        );
        // The same state is fine for the agent: proposals are its own.
        assert!(validate(&state, Role::Agent).is_ok());
    }

    #[test]
    fn agent_state_rejects_unexecuted_confirmed_items() {
        let state = DialogueState::from_items(vec![item(ConfirmStatus::Confirmed)]);
        assert_eq!(
            validate(&state, Role::Agent),
            Err(StateInvariantViolation::UnexecutedConfirmed { index: 0 })
        );
        assert!(validate(&state, Role::User).is_ok());
    }

    #[test]
    fn executed_confirmed_item_is_valid_for_agent() {
        let state = DialogueState::from_items(vec![
            item(ConfirmStatus::Confirmed)
                .with_results(crate::dialogue::ResultSet::new(vec![serde_json::json!({"temp": 72})])),
        ]);
        assert!(validate(&state, Role::Agent).is_ok());
    }
}
