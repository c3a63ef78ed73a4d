use crate::program::Program;
use serde::{Deserialize, Serialize};

/// Who is speaking (and therefore which invariant set and masking policy
/// applies). Exactly two roles exist; all branching on role is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

/// Confirmation lifecycle of a dialogue item.
///
/// Monotonic: an item only ever advances `Proposed → Accepted → Confirmed`.
/// The derived ordering follows declaration order, so "may not regress" is a
/// plain comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmStatus {
    Proposed,
    Accepted,
    Confirmed,
}

/// Output of executing a program, attached to an item exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub rows: Vec<serde_json::Value>,
    /// True when the executor truncated the row list.
    #[serde(default)]
    pub more: bool,
}

impl ResultSet {
    pub fn new(rows: Vec<serde_json::Value>) -> Self {
        Self { rows, more: false }
    }
}

/// One turn's structured command plus its confirmation status and, once
/// executed, its results.
///
/// `program` is set at creation and never mutated; a changed program is a new
/// item, not an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueItem {
    pub program: Program,
    pub confirm: ConfirmStatus,
    #[serde(default)]
    pub results: Option<ResultSet>,
}

impl DialogueItem {
    pub fn new(program: Program, confirm: ConfirmStatus) -> Self {
        Self {
            program,
            confirm,
            results: None,
        }
    }

    pub fn with_results(mut self, results: ResultSet) -> Self {
        self.results = Some(results);
        self
    }

    /// Confirmed but not yet executed. Such an item is what the agent-side
    /// invariant forbids, and what the orchestrator must execute next.
    pub fn needs_execution(&self) -> bool {
        self.confirm == ConfirmStatus::Confirmed && self.results.is_none()
    }
}

/// The accumulated state of a conversation: an ordered sequence of items.
///
/// Order is semantically significant (execution and confirmation precedence).
/// Every transition produces a fresh value; the previous state is never
/// mutated, so callers may keep old states around for logging or training.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueState {
    pub items: Vec<DialogueItem>,
}

impl DialogueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<DialogueItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DialogueItem> {
        self.items.iter()
    }
}
