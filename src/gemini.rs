//! Minimal Gemini client for our use-cases.
//!
//! We only call generateContent and request either plain text or a strict
//! JSON array constrained by a response schema. Calls are instrumented and
//! log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Question, OPTION_COUNT};
use crate::error::ProviderError;
use crate::providers::{FeedbackProvider, QuestionProvider};
use crate::util::{fill_template, trunc_for_log};

/// Returned when the model answers a feedback request with empty text,
/// so the results screen always has something to show.
const DEFAULT_FEEDBACK: &str =
  "Keep practicing the fundamental laws of kinematics to sharpen your problem-solving skills!";

#[derive(Clone)]
pub struct Gemini {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
  prompts: Prompts,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model =
      std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-3-flash-preview".into());
    Self::new(api_key, base_url, model)
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;
    Some(Self { client, api_key, base_url, model, prompts: Prompts::default() })
  }

  /// Swap in prompts from configuration (defaults otherwise).
  pub fn with_prompts(mut self, prompts: Prompts) -> Self {
    self.prompts = prompts;
    self
  }

  /// One generateContent call; returns the concatenated candidate text.
  #[instrument(level = "info", skip(self, prompt, generation_config), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn generate(
    &self,
    prompt: &str,
    generation_config: Option<GenerationConfig>,
  ) -> Result<String, ProviderError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.into() }] }],
      generation_config,
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "motionmaster-core/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", self.api_key.as_str())
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_gemini_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(ProviderError::Api { status, message });
    }

    let body: GenerateContentResponse = res.json().await?;
    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        completion_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }
    let text = body.candidates.into_iter().next()
      .and_then(|c| c.content)
      .map(|c| {
        c.parts.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join("")
      })
      .unwrap_or_default();

    Ok(text.trim().to_string())
  }

  // --- High-level helpers (domain-specialized) ---

  /// Generate a full batch of kinematics questions. The whole batch is
  /// rejected if any record violates the contract.
  #[instrument(level = "info", skip(self), fields(model = %self.model))]
  pub async fn generate_questions(&self, count: usize) -> Result<Vec<Question>, ProviderError> {
    let prompt = fill_template(
      &self.prompts.question_user_template,
      &[("count", &count.to_string())],
    );
    let config = GenerationConfig {
      response_mime_type: Some("application/json".into()),
      response_schema: Some(question_batch_schema()),
    };

    let start = std::time::Instant::now();
    let result = self.generate(&prompt, Some(config)).await;
    let elapsed = start.elapsed();

    let text = match result {
      Ok(t) => {
        info!(?elapsed, "Model response received successfully");
        t
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during question generation");
        return Err(e);
      }
    };

    if text.is_empty() {
      return Err(ProviderError::EmptyResponse);
    }
    let questions: Vec<Question> = serde_json::from_str(&text)?;
    validate_batch(&questions, count)?;

    info!(
      count = questions.len(),
      first_preview = %questions[0].question.chars().take(40).collect::<String>(),
      "Question batch generated"
    );
    Ok(questions)
  }

  /// Short performance commentary for the results screen. An empty model
  /// reply degrades to a canned encouragement rather than an error.
  #[instrument(level = "info", skip(self), fields(model = %self.model))]
  pub async fn performance_feedback(
    &self,
    score: usize,
    total: usize,
  ) -> Result<String, ProviderError> {
    let prompt = fill_template(
      &self.prompts.feedback_user_template,
      &[("score", &score.to_string()), ("total", &total.to_string())],
    );
    let text = self.generate(&prompt, None).await?;
    if text.is_empty() {
      return Ok(DEFAULT_FEEDBACK.into());
    }
    Ok(text)
  }
}

impl QuestionProvider for Gemini {
  async fn fetch_questions(&self, count: usize) -> Result<Vec<Question>, ProviderError> {
    self.generate_questions(count).await
  }
}

impl FeedbackProvider for Gemini {
  async fn fetch_feedback(&self, score: usize, total: usize) -> Result<String, ProviderError> {
    self.performance_feedback(score, total).await
  }
}

/// Count, option arity, and answer index must all hold; anything else
/// fails the whole batch.
fn validate_batch(questions: &[Question], expected: usize) -> Result<(), ProviderError> {
  if questions.len() != expected {
    return Err(ProviderError::Malformed(format!(
      "expected {} questions, got {}",
      expected,
      questions.len()
    )));
  }
  for q in questions {
    if q.options.len() != OPTION_COUNT {
      return Err(ProviderError::Malformed(format!(
        "question {} has {} options",
        q.id,
        q.options.len()
      )));
    }
    if q.correct_answer >= OPTION_COUNT {
      return Err(ProviderError::Malformed(format!(
        "question {} has correct-answer index {}",
        q.id, q.correct_answer
      )));
    }
  }
  Ok(())
}

/// Response schema sent with the question request: an array of question
/// objects, all fields required.
fn question_batch_schema() -> serde_json::Value {
  serde_json::json!({
    "type": "ARRAY",
    "items": {
      "type": "OBJECT",
      "properties": {
        "id": { "type": "INTEGER" },
        "question": { "type": "STRING" },
        "options": {
          "type": "ARRAY",
          "items": { "type": "STRING" },
          "description": "Array of 4 options (A, B, C, D)"
        },
        "correctAnswer": {
          "type": "INTEGER",
          "description": "Index (0-3) of the correct option"
        },
        "explanation": { "type": "STRING" }
      },
      "required": ["id", "question", "options", "correctAnswer", "explanation"]
    }
  })
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  contents: Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}
#[derive(Serialize)]
struct Content { parts: Vec<Part> }
#[derive(Serialize)]
struct Part { text: String }
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  response_mime_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)] content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)] parts: Vec<PartOut>,
}
#[derive(Deserialize)]
struct PartOut {
  #[serde(default)] text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client_for(server: &mockito::ServerGuard) -> Gemini {
    Gemini::new("test-key".into(), server.url(), "gemini-test".into()).expect("client builds")
  }

  /// Wrap `text` the way generateContent responses carry it.
  fn model_reply(text: &str) -> String {
    serde_json::json!({
      "candidates": [{ "content": { "parts": [{ "text": text }] } }],
      "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 20, "totalTokenCount": 30 }
    })
    .to_string()
  }

  fn wire_question(id: i64, options: usize, correct: i64) -> serde_json::Value {
    serde_json::json!({
      "id": id,
      "question": "A car accelerates from rest at 2 m/s². What is its speed after 5 s?",
      "options": (0..options).map(|i| format!("{} m/s", 10 * (i + 1))).collect::<Vec<_>>(),
      "correctAnswer": correct,
      "explanation": "v = u + at = 0 + 2(5) = 10 m/s."
    })
  }

  #[tokio::test]
  async fn parses_a_valid_question_batch() {
    let mut server = mockito::Server::new_async().await;
    let batch = serde_json::json!([wire_question(1, 4, 0), wire_question(2, 4, 3)]).to_string();
    let _m = server
      .mock("POST", "/models/gemini-test:generateContent")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(model_reply(&batch))
      .create_async()
      .await;

    let questions = client_for(&server).generate_questions(2).await.expect("batch parses");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].correct_answer, 0);
    assert_eq!(questions[1].correct_answer, 3);
    assert_eq!(questions[0].options.len(), 4);
  }

  #[tokio::test]
  async fn rejects_a_batch_with_wrong_option_arity() {
    let mut server = mockito::Server::new_async().await;
    let batch = serde_json::json!([wire_question(1, 3, 0)]).to_string();
    let _m = server
      .mock("POST", "/models/gemini-test:generateContent")
      .with_status(200)
      .with_body(model_reply(&batch))
      .create_async()
      .await;

    let err = client_for(&server).generate_questions(1).await.expect_err("must fail");
    assert!(matches!(err, ProviderError::Malformed(_)), "got {err:?}");
  }

  #[tokio::test]
  async fn rejects_an_incomplete_batch() {
    let mut server = mockito::Server::new_async().await;
    let batch = serde_json::json!([wire_question(1, 4, 0)]).to_string();
    let _m = server
      .mock("POST", "/models/gemini-test:generateContent")
      .with_status(200)
      .with_body(model_reply(&batch))
      .create_async()
      .await;

    let err = client_for(&server).generate_questions(5).await.expect_err("must fail");
    assert!(matches!(err, ProviderError::Malformed(_)), "got {err:?}");
  }

  #[tokio::test]
  async fn surfaces_api_error_messages() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
      .mock("POST", "/models/gemini-test:generateContent")
      .with_status(400)
      .with_body(r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#)
      .create_async()
      .await;

    let err = client_for(&server).generate_questions(1).await.expect_err("must fail");
    match err {
      ProviderError::Api { status, message } => {
        assert_eq!(status, 400);
        assert_eq!(message, "API key not valid");
      }
      other => panic!("expected Api error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn empty_feedback_degrades_to_default_text() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
      .mock("POST", "/models/gemini-test:generateContent")
      .with_status(200)
      .with_body(model_reply(""))
      .create_async()
      .await;

    let text = client_for(&server).performance_feedback(7, 15).await.expect("succeeds");
    assert_eq!(text, DEFAULT_FEEDBACK);
  }

  #[tokio::test]
  async fn feedback_returns_trimmed_model_text() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
      .mock("POST", "/models/gemini-test:generateContent")
      .with_status(200)
      .with_body(model_reply("  Strong grasp of v = u + at.  "))
      .create_async()
      .await;

    let text = client_for(&server).performance_feedback(12, 15).await.expect("succeeds");
    assert_eq!(text, "Strong grasp of v = u + at.");
  }
}
