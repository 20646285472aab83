//! Quiz parameters and model prompts, loaded from TOML.
//!
//! See `QuizConfig` for the expected schema. Every field has a compiled
//! default, so the crate is usable without any config file.

use serde::Deserialize;
use tracing::{error, info};

/// Quiz parameters plus prompts. Loaded from QUIZ_CONFIG_PATH or defaulted.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
  pub quiz: QuizParams,
  pub prompts: Prompts,
  /// Shown instead of model feedback when the feedback fetch fails.
  pub fallback_feedback: String,
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      quiz: QuizParams::default(),
      prompts: Prompts::default(),
      fallback_feedback: "Great effort completing the kinematics challenge!".into(),
    }
  }
}

/// Session shape: how many questions, how long the countdown runs.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizParams {
  /// Fixed number of questions per session.
  pub total_questions: usize,
  /// Countdown duration in seconds.
  pub duration_secs: u32,
}

impl Default for QuizParams {
  fn default() -> Self {
    Self { total_questions: 15, duration_secs: 300 }
  }
}

/// Prompts used by the Gemini client. Defaults target the kinematics quiz.
/// You can override them in TOML if you need to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  /// Question generation; `{count}` is filled with the configured batch size.
  pub question_user_template: String,
  /// Performance feedback; `{score}` and `{total}` are filled at finish.
  pub feedback_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      question_user_template: "Generate {count} unique, high-quality multiple-choice physics questions focusing exclusively on the three equations of motion:\n1. v = u + at\n2. s = ut + ½at²\n3. v² = u² + 2as\n\nThe questions should vary in difficulty (easy, medium, hard).\nInclude scenarios like cars accelerating, free fall (g = 9.8m/s²), braking to a stop, and projectile start/stop moments.\nEnsure numerical values are realistic.".into(),
      feedback_user_template: "A student just completed a physics quiz on Equations of Motion.\nThey scored {score} out of {total}.\nProvide a short, encouraging, and highly professional performance analysis (2-3 sentences).\nFocus on their understanding of v = u+at, s = ut+0.5at², and v² = u²+2as based on this score.".into(),
    }
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "motionmaster_core", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "motionmaster_core", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "motionmaster_core", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
