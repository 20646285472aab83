//! Domain models: the generated question, quiz lifecycle status, and the
//! profile record used by the auth gate.

use serde::{Deserialize, Serialize};

/// Options every question carries (A through D).
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice question as produced by the question provider.
/// Immutable once received.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: i64,
  pub question: String,
  /// Exactly four option strings; validated on receipt.
  pub options: Vec<String>,
  /// Index (0-3) of the correct option.
  pub correct_answer: usize,
  pub explanation: String,
}

/// Quiz lifecycle status as seen by the presentation layer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
  Idle,
  Loading,
  Active,
  Finished,
}

/// Who is playing. Only gates access; quiz logic never reads it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
  pub name: String,
  pub email: String,
}
