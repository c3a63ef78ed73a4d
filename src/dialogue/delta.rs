use super::state::{DialogueItem, DialogueState, ResultSet, Role};
use serde::{Deserialize, Serialize};

/// One entry of a prediction delta.
///
/// `Update` deliberately has no program field: a changed program at an
/// existing position is not a supported edit and must appear as an appended
/// item, so the type cannot even express it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeltaEntry {
    Update {
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confirm: Option<super::state::ConfirmStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        results: Option<ResultSet>,
    },
    Append {
        item: DialogueItem,
    },
}

/// The minimal change set explaining a transition between two dialogue
/// states — what the sequence predictor is trained to produce.
///
/// Everything unambiguously derivable by carrying forward unchanged fields
/// from the old state is omitted; in particular, unchanged results never
/// appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    entries: Vec<DeltaEntry>,
}

impl Prediction {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DeltaEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DeltaEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convenience constructor for the orchestrator: attach execution
    /// results to the item at `index`.
    pub fn attach_results(index: usize, results: ResultSet) -> Self {
        Self {
            entries: vec![DeltaEntry::Update {
                index,
                confirm: None,
                results: Some(results),
            }],
        }
    }
}

/// Computes the minimal prediction explaining `old → new` for the given role.
///
/// Walks both item sequences in order. Positions present in both emit an
/// `Update` only when `confirm` advanced or results transitioned from absent
/// to present; the program at a shared position is assumed unchanged.
/// Trailing positions of `new` emit full `Append` entries. Deterministic,
/// and neither input is modified.
///
/// The role does not change the shape of the delta, only which transitions
/// are reachable; it is threaded through so the differ and applier agree on
/// their contract.
pub fn compute_prediction(
    old: &DialogueState,
    new: &DialogueState,
    _role: Role,
) -> Prediction {
    let mut prediction = Prediction::empty();

    for (index, (old_item, new_item)) in old.iter().zip(new.iter()).enumerate() {
        let confirm = (new_item.confirm > old_item.confirm).then_some(new_item.confirm);
        let results = match (&old_item.results, &new_item.results) {
            (None, Some(results)) => Some(results.clone()),
            _ => None,
        };
        if confirm.is_some() || results.is_some() {
            prediction.push(DeltaEntry::Update {
                index,
                confirm,
                results,
            });
        }
    }

    for item in new.iter().skip(old.len()) {
        prediction.push(DeltaEntry::Append { item: item.clone() });
    }

    prediction
}
