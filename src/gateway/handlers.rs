use super::AppState;
use crate::predictor::PredictTask;
use crate::tokenizer::{self, EntityMap};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub(super) struct QueryBody {
    pub q: String,
    pub locale: String,
    /// Conditioning context as a token stream; absent for context-free
    /// parsing.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub entities: EntityMap,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub skip_typechecking: bool,
}

#[derive(Serialize)]
struct CandidateBody {
    code: Vec<String>,
    score: f64,
}

/// Fixed conditioning question for surface-realization prediction.
const NLG_QUESTION: &str = "what should the agent say ?";

#[derive(Deserialize)]
pub(super) struct AnswerBody {
    pub locale: String,
    /// Agent-side context tokens for the state being narrated.
    pub context: String,
    /// Dialogue-act tokens the reply must realize.
    pub target: String,
    #[serde(default)]
    pub entities: EntityMap,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct AnswerCandidateBody {
    answer: String,
    score: f64,
}

#[derive(Deserialize)]
pub(super) struct TokenizeBody {
    pub q: String,
    pub locale: String,
    #[serde(default)]
    pub entities: EntityMap,
}

fn unsupported_language() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Unsupported language" })),
    )
}

/// POST /query — semantic parsing / dialogue-state prediction.
///
/// Candidates that fail to round-trip through the codec are dropped
/// per-candidate; the request only fails when the predictor itself does.
pub(super) async fn handle_query(
    State(state): State<AppState>,
    Json(body): Json<QueryBody>,
) -> impl IntoResponse {
    if body.locale != state.locale {
        return unsupported_language();
    }

    let mut tokenized = tokenizer::tokenize(&body.q);
    tokenizer::renumber_entities(&mut tokenized, &body.entities);

    // Nothing to parse; answer with the sentinel instead of asking the
    // predictor to rank an empty utterance.
    if tokenized.tokens.is_empty() {
        return (
            StatusCode::OK,
            Json(serde_json::json!({
                "candidates": [{
                    "code": ["bookkeeping", "special", "special:failed"],
                    "score": "Infinity",
                }],
                "tokens": tokenized.tokens,
                "entities": tokenized.entities,
            })),
        );
    }

    let question = tokenized.tokens.join(" ");

    let prediction = match &body.context {
        Some(context) => {
            state
                .predictor
                .predict(context, Some(&question), PredictTask::DialogueNlu)
                .await
        }
        None => state.predictor.predict(&question, None, PredictTask::Parse).await,
    };

    let candidates = match prediction {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(%err, "prediction failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": err.to_string() })),
            );
        }
    };

    let limit = body.limit.unwrap_or(state.max_candidates);
    let kept: Vec<CandidateBody> = candidates
        .into_iter()
        .filter(|candidate| {
            if body.skip_typechecking {
                return true;
            }
            let ok = if body.context.is_some() {
                state.codec.parse_prediction(&candidate.answer).is_ok()
            } else {
                state.codec.parse(&candidate.answer).is_ok()
            };
            if !ok {
                tracing::debug!(score = candidate.score, "dropping unparsable candidate");
            }
            ok
        })
        .take(limit)
        .map(|candidate| CandidateBody {
            code: candidate.answer,
            score: candidate.score,
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "candidates": kept,
            "tokens": tokenized.tokens,
            "entities": tokenized.entities,
        })),
    )
}

/// POST /answer — surface realization for an agent dialogue act.
///
/// The context and target-act tokens are concatenated into the conditioning
/// stream; candidate sentences come back with entity placeholders, which are
/// substituted from the request's entity map before the response is built.
pub(super) async fn handle_answer(
    State(state): State<AppState>,
    Json(body): Json<AnswerBody>,
) -> impl IntoResponse {
    if body.locale != state.locale {
        return unsupported_language();
    }

    let context = format!("{} {}", body.context, body.target);
    let candidates = match state
        .predictor
        .predict(&context, Some(NLG_QUESTION), PredictTask::DialogueNlg)
        .await
    {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(%err, "answer prediction failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": err.to_string() })),
            );
        }
    };

    let limit = body.limit.unwrap_or(state.max_candidates);
    let kept: Vec<AnswerCandidateBody> = candidates
        .into_iter()
        .take(limit)
        .map(|candidate| AnswerCandidateBody {
            answer: substitute_entities(&candidate.answer, &body.entities),
            score: candidate.score,
        })
        .collect();

    (StatusCode::OK, Json(serde_json::json!({ "candidates": kept })))
}

/// Replaces `NUMBER_0`-style placeholder tokens with their surface value and
/// joins the rest into a sentence.
fn substitute_entities(tokens: &[String], entities: &EntityMap) -> String {
    let words: Vec<String> = tokens
        .iter()
        .map(|token| match entities.get(token) {
            Some(serde_json::Value::String(surface)) => surface.clone(),
            Some(value) => value.to_string(),
            None => token.clone(),
        })
        .collect();
    words.join(" ")
}

/// POST /tokenize — tokenizer with entity renumbering.
pub(super) async fn handle_tokenize(
    State(state): State<AppState>,
    Json(body): Json<TokenizeBody>,
) -> impl IntoResponse {
    if body.locale != state.locale {
        return unsupported_language();
    }

    let mut tokenized = tokenizer::tokenize(&body.q);
    tokenizer::renumber_entities(&mut tokenized, &body.entities);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "tokens": tokenized.tokens,
            "entities": tokenized.entities,
        })),
    )
}

/// POST /learn — online learning is not available on this server.
pub(super) async fn handle_learn() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({ "error": "Learning is not available with this server" })),
    )
}
