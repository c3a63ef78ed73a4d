//! Per-conversation orchestration.
//!
//! One [`DialogueSession`] owns one conversation's state chain and drives the
//! full control flow of a turn: project the context, query the predictor,
//! recover per-candidate failures, apply the winning delta, execute whatever
//! became ready, and attach the results. Sessions share nothing; every
//! collaborator handle is injected, so any number of sessions can run in
//! parallel without coordination.

use crate::dialogue::{
    DialogueState, Prediction, Role, compute_new_state, prepare_context, validate,
};
use crate::error::{ExecutionError, SessionError};
use crate::executor::Executor;
use crate::predictor::{PredictTask, Predictor};
use crate::program::ProgramCodec;
use std::sync::Arc;
use uuid::Uuid;

/// What a completed turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The validated state after the turn (execution results attached).
    pub state: DialogueState,
    /// The delta that was applied, as parsed from the winning candidate.
    pub prediction: Prediction,
    /// Set when a ready item could not be executed. The turn still
    /// completes; the caller surfaces the failure to the user.
    pub execution_error: Option<ExecutionError>,
}

pub struct DialogueSession {
    id: Uuid,
    state: DialogueState,
    predictor: Arc<dyn Predictor>,
    executor: Arc<dyn Executor>,
    codec: Arc<dyn ProgramCodec>,
}

impl DialogueSession {
    pub fn new(
        predictor: Arc<dyn Predictor>,
        executor: Arc<dyn Executor>,
        codec: Arc<dyn ProgramCodec>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: DialogueState::new(),
            predictor,
            executor,
            codec,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Runs one user turn end to end.
    ///
    /// Candidates that fail to parse or that produce an invalid state are
    /// dropped individually; the turn only fails when no candidate survives.
    pub async fn turn(&mut self, utterance: &str) -> Result<TurnOutcome, SessionError> {
        let context = prepare_context(&self.state, Role::User);
        let context_text = context.to_tokens(self.codec.as_ref()).join(" ");

        let candidates = self
            .predictor
            .predict(&context_text, Some(utterance), PredictTask::DialogueNlu)
            .await?;

        let mut winner = None;
        for candidate in &candidates {
            let prediction = match self.codec.parse_prediction(&candidate.answer) {
                Ok(prediction) => prediction,
                Err(err) => {
                    tracing::debug!(score = candidate.score, %err, "dropping unparsable candidate");
                    continue;
                }
            };
            match compute_new_state(&self.state, &prediction, Role::User) {
                Ok(state) => {
                    winner = Some((state, prediction));
                    break;
                }
                Err(err) => {
                    tracing::debug!(score = candidate.score, %err, "dropping invalid candidate");
                }
            }
        }
        let (mut state, prediction) = winner.ok_or(SessionError::NoViableCandidate)?;

        // Execute whatever the new state made ready, attaching results one
        // item at a time so each attachment is itself a validated transition.
        let mut execution_error = None;
        let ready: Vec<usize> = state
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.needs_execution().then_some(index))
            .collect();
        for index in ready {
            let program = state.items[index].program.clone();
            match self.executor.execute(&program).await {
                Ok(results) => {
                    let attach = Prediction::attach_results(index, results);
                    state = compute_new_state(&state, &attach, Role::User)?;
                }
                Err(err) => {
                    tracing::warn!(session = %self.id, %err, function = %program.function, "execution failed");
                    execution_error = Some(err);
                    break;
                }
            }
        }

        // The agent policy runs next; a fully executed turn must already
        // satisfy its invariant unless execution failed midway.
        if execution_error.is_none() {
            validate(&state, Role::Agent)?;
        }

        self.state = state.clone();
        Ok(TurnOutcome {
            state,
            prediction,
            execution_error,
        })
    }
}
