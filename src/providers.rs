//! Contracts for the two external collaborators the quiz depends on.
//!
//! Both are single best-effort asynchronous calls with a binary outcome;
//! the engine decides what a failure means (question fetch: back to idle,
//! feedback fetch: fallback text). Futures carry a `Send` bound so the
//! driver can run them on spawned tasks.

use std::future::Future;

use crate::domain::Question;
use crate::error::ProviderError;

/// Source of a full question batch. Must return exactly `count` well-formed
/// questions or fail as a unit; partial batches are a failure.
pub trait QuestionProvider: Send + Sync + 'static {
  fn fetch_questions(
    &self,
    count: usize,
  ) -> impl Future<Output = Result<Vec<Question>, ProviderError>> + Send;
}

/// Source of the natural-language performance commentary shown on the
/// results screen. Pure function of score and total from the caller's view.
pub trait FeedbackProvider: Send + Sync + 'static {
  fn fetch_feedback(
    &self,
    score: usize,
    total: usize,
  ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}
