use super::{Candidate, PredictTask, Predictor};
use crate::error::PredictorError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct PredictRequest<'a> {
    task: &'static str,
    context: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<&'a str>,
}

#[derive(Deserialize)]
struct PredictResponse {
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize)]
struct WireCandidate {
    /// Space-separated answer tokens.
    answer: String,
    score: f64,
}

/// HTTP client for a predictor service speaking a small JSON protocol:
/// `POST {base_url}/predict` with task, context, and optional question.
pub struct RemotePredictor {
    client: reqwest::Client,
    predict_url: String,
}

impl RemotePredictor {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(
                timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            predict_url: format!("{}/predict", base_url.trim_end_matches('/')),
        }
    }

    async fn call(
        &self,
        context: &str,
        question: Option<&str>,
        task: PredictTask,
    ) -> Result<Vec<Candidate>, PredictorError> {
        let request = PredictRequest {
            task: task.id(),
            context,
            question,
        };
        let response = self
            .client
            .post(&self.predict_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictorError::Malformed(e.to_string()))?;

        if body.candidates.is_empty() {
            return Err(PredictorError::Empty);
        }

        let mut candidates: Vec<Candidate> = body
            .candidates
            .into_iter()
            .map(|c| Candidate {
                answer: c.answer.split_whitespace().map(str::to_string).collect(),
                score: c.score,
            })
            .collect();
        // Best-first, regardless of service ordering.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(candidates)
    }
}

impl Predictor for RemotePredictor {
    fn predict<'a>(
        &'a self,
        context: &'a str,
        question: Option<&'a str>,
        task: PredictTask,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>, PredictorError>> + Send + 'a>> {
        Box::pin(self.call(context, question, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_and_reranks_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(serde_json::json!({
                "task": "dialogue_nlu",
                "question": "what is the weather"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "answer": "append accepted noop ( ) ;", "score": 0.2 },
                    { "answer": "append accepted get_current_weather ( ) ;", "score": 0.9 }
                ]
            })))
            .mount(&server)
            .await;

        let predictor = RemotePredictor::new(&server.uri(), Some(5));
        let candidates = predictor
            .predict("", Some("what is the weather"), PredictTask::DialogueNlu)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].score > candidates[1].score);
        assert_eq!(candidates[0].answer[2], "get_current_weather");
    }

    #[tokio::test]
    async fn empty_candidate_list_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let predictor = RemotePredictor::new(&server.uri(), Some(5));
        let err = predictor
            .predict("ctx", None, PredictTask::Parse)
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::Empty));
    }

    #[tokio::test]
    async fn http_errors_surface_as_request_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let predictor = RemotePredictor::new(&server.uri(), Some(5));
        let err = predictor
            .predict("ctx", None, PredictTask::Parse)
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::Request(_)));
    }
}
