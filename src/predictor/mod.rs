//! The neural predictor boundary.
//!
//! The predictor is a separate service: it receives a context token stream
//! (and for dialogue tasks, the current utterance as a question) and returns
//! ranked candidate token sequences. The core never depends on how the model
//! is hosted; everything goes through the [`Predictor`] trait.

mod remote;

pub use remote::RemotePredictor;

use crate::error::PredictorError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Which head of the model to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictTask {
    /// Context-free semantic parsing of a single utterance.
    Parse,
    /// Dialogue-state prediction for the user-facing turn.
    DialogueNlu,
    /// Agent utterance generation.
    DialogueNlg,
}

impl PredictTask {
    /// Task identifier on the wire.
    pub fn id(self) -> &'static str {
        match self {
            PredictTask::Parse => "parse",
            PredictTask::DialogueNlu => "dialogue_nlu",
            PredictTask::DialogueNlg => "dialogue_nlg",
        }
    }
}

/// One ranked hypothesis from the predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Predicted answer, as tokens.
    pub answer: Vec<String>,
    pub score: f64,
}

pub trait Predictor: Send + Sync {
    /// Runs one prediction. `question` carries the current utterance for
    /// dialogue tasks and is absent for context-free parsing.
    fn predict<'a>(
        &'a self,
        context: &'a str,
        question: Option<&'a str>,
        task: PredictTask,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>, PredictorError>> + Send + 'a>>;
}
