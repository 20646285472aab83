//! MotionMaster · Physics Quiz Engine
//!
//! - Quiz lifecycle state machine (countdown timer, navigation, scoring)
//! - Async driver wiring the engine to question/feedback providers
//! - Gemini integration for question generation and performance feedback
//! - Auth gate + persisted user profile
//!
//! The crate is the engine behind the quiz UI; rendering belongs to the
//! embedding application, which drives a `QuizDriver` and draws its
//! session snapshots.
//!
//! Important env variables:
//!   GEMINI_API_KEY    : enables the Gemini provider if present
//!   GEMINI_BASE_URL   : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL      : default "gemini-3-flash-preview"
//!   QUIZ_CONFIG_PATH  : path to TOML config (quiz parameters + prompts)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

pub mod telemetry;
pub mod util;
pub mod error;
pub mod domain;
pub mod config;
pub mod engine;
pub mod providers;
pub mod gemini;
pub mod driver;
pub mod profile;
pub mod auth;

pub use auth::{AuthGate, AuthStatus, SocialProvider};
pub use config::{load_config_from_env, Prompts, QuizConfig, QuizParams};
pub use domain::{Question, QuizStatus, User, OPTION_COUNT};
pub use driver::QuizDriver;
pub use engine::{QuizEffect, QuizEngine, QuizEvent, QuizSession};
pub use error::{ProfileError, ProviderError};
pub use gemini::Gemini;
pub use profile::ProfileStore;
pub use providers::{FeedbackProvider, QuestionProvider};
