use super::state::{ConfirmStatus, DialogueState, ResultSet, Role};
use crate::program::{Program, ProgramCodec};
use serde::{Deserialize, Serialize};

/// Rows kept per result set in a projected context. The predictor only needs
/// the head of a result list to condition on.
pub const MAX_CONTEXT_RESULTS: usize = 3;

/// One item of a projected context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    pub program: Program,
    pub confirm: ConfirmStatus,
    #[serde(default)]
    pub results: Option<ResultSet>,
}

/// The conditioning representation handed to the external predictor.
///
/// A pure projection of `(state, role)` — no hidden inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub items: Vec<ContextItem>,
}

impl Context {
    /// Flattens the projection into the token stream a sequence predictor
    /// consumes. Result rows are summarized as a count, never inlined.
    pub fn to_tokens(&self, codec: &dyn ProgramCodec) -> Vec<String> {
        let mut tokens = Vec::new();
        for item in &self.items {
            tokens.extend(codec.serialize(&item.program));
            tokens.push(match item.confirm {
                ConfirmStatus::Proposed => "status:proposed".into(),
                ConfirmStatus::Accepted => "status:accepted".into(),
                ConfirmStatus::Confirmed => "status:confirmed".into(),
            });
            if let Some(results) = &item.results {
                tokens.push(format!("results:{}", results.rows.len()));
                if results.more {
                    tokens.push("more".into());
                }
            }
        }
        tokens
    }
}

/// Projects a state into the context fed to the predictor for `role`.
///
/// Masking policy: the user-side projection must not leak what the agent has
/// not yet announced, so results on the trailing run of `Confirmed` items
/// (executed this turn, not yet narrated) are elided. Surviving result sets
/// are truncated to [`MAX_CONTEXT_RESULTS`] rows for both roles; the agent
/// projection is otherwise complete.
pub fn prepare_context(state: &DialogueState, role: Role) -> Context {
    // Index of the first item of the trailing confirmed run.
    let announced_end = state
        .iter()
        .rposition(|item| item.confirm != ConfirmStatus::Confirmed)
        .map_or(0, |i| i + 1);

    let items = state
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mask = role == Role::User && index >= announced_end;
            let results = if mask {
                None
            } else {
                item.results.as_ref().map(truncate_results)
            };
            ContextItem {
                program: item.program.clone(),
                confirm: item.confirm,
                results,
            }
        })
        .collect();

    Context { items }
}

fn truncate_results(results: &ResultSet) -> ResultSet {
    if results.rows.len() <= MAX_CONTEXT_RESULTS {
        return results.clone();
    }
    ResultSet {
        rows: results.rows[..MAX_CONTEXT_RESULTS].to_vec(),
        more: true,
    }
}
