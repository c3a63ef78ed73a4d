//! The execution collaborator boundary.
//!
//! The state machine never executes anything itself: the orchestrator runs a
//! program through an [`Executor`] and attaches the returned results to the
//! relevant dialogue item via a prediction. Execution failures are a normal,
//! recoverable turn outcome.

mod simulator;

pub use simulator::SimulationExecutor;

use crate::dialogue::ResultSet;
use crate::error::ExecutionError;
use crate::program::Program;
use std::future::Future;
use std::pin::Pin;

pub trait Executor: Send + Sync {
    fn execute<'a>(
        &'a self,
        program: &'a Program,
    ) -> Pin<Box<dyn Future<Output = Result<ResultSet, ExecutionError>> + Send + 'a>>;
}
