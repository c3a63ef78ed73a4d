//! The turn-based state-transition and delta-encoding core.
//!
//! Every operation here is a synchronous, pure function of its explicit
//! inputs: safe to call concurrently from independent conversation sessions
//! as long as each session owns its own state chain. The async world
//! (predictor, executor, HTTP) lives in the surrounding layers.

mod apply;
mod constants;
mod context;
mod delta;
mod state;
mod validate;

pub use apply::compute_new_state;
pub use constants::{Constant, ConstantType, create_constants, extract_constants};
pub use context::{Context, ContextItem, MAX_CONTEXT_RESULTS, prepare_context};
pub use delta::{DeltaEntry, Prediction, compute_prediction};
pub use state::{ConfirmStatus, DialogueItem, DialogueState, ResultSet, Role};
pub use validate::validate;
