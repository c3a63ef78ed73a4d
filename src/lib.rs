#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod dialogue;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod predictor;
pub mod program;
pub mod session;
pub mod tokenizer;

pub use config::Config;
pub use dialogue::{
    ConfirmStatus, DialogueItem, DialogueState, Prediction, ResultSet, Role, compute_new_state,
    compute_prediction, prepare_context, validate,
};
pub use error::{ParlanceError, StateInvariantViolation};
