use thiserror::Error;

use crate::dialogue::ConfirmStatus;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `parlance`.
///
/// Each subsystem defines its own error enum. Library callers can match on
/// these to decide recovery strategy; binary-level code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ParlanceError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Dialogue state machine ──────────────────────────────────────────
    #[error("state: {0}")]
    State(#[from] StateInvariantViolation),

    // ── Program codec ───────────────────────────────────────────────────
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    // ── Predictor ───────────────────────────────────────────────────────
    #[error("predictor: {0}")]
    Predictor(#[from] PredictorError),

    // ── Execution ───────────────────────────────────────────────────────
    #[error("execution: {0}")]
    Execution(#[from] ExecutionError),

    // ── Session orchestration ───────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Dialogue state invariants ──────────────────────────────────────────────

/// A dialogue state, or a prediction applied to one, broke the
/// role-dependent confirm/results rules.
///
/// Not recoverable locally: it signals a malformed prediction or an upstream
/// defect, and must propagate to the orchestrator instead of being silently
/// corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateInvariantViolation {
    #[error("item {index} is still proposed in a user-side state")]
    ProposedItem { index: usize },

    #[error("item {index} is confirmed but was never executed")]
    UnexecutedConfirmed { index: usize },

    #[error("item {index}: confirm may not regress from {from:?} to {to:?}")]
    ConfirmRegression {
        index: usize,
        from: ConfirmStatus,
        to: ConfirmStatus,
    },

    #[error("item {index}: results are already set and may not be overwritten")]
    ResultsOverwrite { index: usize },

    #[error("prediction updates item {index} but the state only has {len} items")]
    UpdateOutOfRange { index: usize, len: usize },
}

// ─── Program codec errors ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of token stream")]
    UnexpectedEnd,

    #[error("unexpected token `{token}` at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("unknown confirm status `{0}`")]
    UnknownConfirm(String),

    #[error("trailing tokens after a complete prediction")]
    TrailingTokens,
}

// ─── Predictor errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("predictor request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("predictor returned a malformed response: {0}")]
    Malformed(String),

    #[error("predictor returned no candidates")]
    Empty,
}

// ─── Execution errors ───────────────────────────────────────────────────────

/// Failure from the execution collaborator. Recoverable at the orchestrator
/// level: the session surfaces a failed turn instead of crashing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("function `{0}` not found")]
    NotFound(String),

    #[error("permission denied running `{0}`")]
    PermissionDenied(String),

    #[error("runtime error in `{function}`: {message}")]
    Runtime { function: String, message: String },

    #[error("execution of `{0}` timed out")]
    Timeout(String),
}

// ─── Session errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("predictor: {0}")]
    Predictor(#[from] PredictorError),

    #[error("no predictor candidate produced a usable dialogue state")]
    NoViableCandidate,

    #[error("state invariant: {0}")]
    Invariant(#[from] StateInvariantViolation),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ParlanceError>;
