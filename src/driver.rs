//! Async driver: wires the engine to providers and the countdown ticker.
//!
//! All session mutation is serialized through one event loop. Public
//! methods enqueue events; the loop applies each one to the engine and
//! executes the returned effects:
//!   - fetch effects spawn a task that awaits the provider and feeds the
//!     result back into the loop as a generation-tagged event;
//!   - ticker effects start/stop the 1-second Tick task, so no tick can
//!     reach a session that already left the active state.
//!
//! Because results re-enter through the same queue, the engine sees a
//! strictly ordered event stream even though fetches overlap user input.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::QuizConfig;
use crate::engine::{QuizEffect, QuizEngine, QuizEvent, QuizSession};
use crate::providers::{FeedbackProvider, QuestionProvider};

const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct QuizDriver<Q, F> {
  inner: Arc<Inner<Q, F>>,
  event_loop: JoinHandle<()>,
}

struct Inner<Q, F> {
  engine: RwLock<QuizEngine>,
  questions: Q,
  feedback: F,
  events: mpsc::UnboundedSender<QuizEvent>,
}

impl<Q, F> QuizDriver<Q, F>
where
  Q: QuestionProvider,
  F: FeedbackProvider,
{
  pub fn new(config: QuizConfig, questions: Q, feedback: F) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let inner = Arc::new(Inner {
      engine: RwLock::new(QuizEngine::new(config)),
      questions,
      feedback,
      events: tx,
    });
    let event_loop = tokio::spawn(run_loop(inner.clone(), rx));
    info!(target: "motionmaster_core", "Quiz driver started");
    Self { inner, event_loop }
  }

  // ── User actions ─────────────────────────────────────────────────

  pub fn start_quiz(&self) {
    self.send(QuizEvent::StartRequested);
  }

  pub fn select_answer(&self, option: usize) {
    self.send(QuizEvent::AnswerSelected { option });
  }

  pub fn next_question(&self) {
    self.send(QuizEvent::NextRequested);
  }

  pub fn prev_question(&self) {
    self.send(QuizEvent::PrevRequested);
  }

  pub fn reset(&self) {
    self.send(QuizEvent::ResetRequested);
  }

  // ── Queries ──────────────────────────────────────────────────────

  /// Cloned view of the session for rendering.
  pub async fn snapshot(&self) -> QuizSession {
    self.inner.engine.read().await.session().clone()
  }

  pub async fn last_error(&self) -> Option<String> {
    self.inner.engine.read().await.last_error().map(str::to_string)
  }

  /// Stop processing events. Also happens on drop.
  pub fn close(&self) {
    self.event_loop.abort();
  }

  fn send(&self, event: QuizEvent) {
    if self.inner.events.send(event).is_err() {
      warn!(target: "motionmaster_core", "Driver loop is gone; event dropped");
    }
  }
}

impl<Q, F> Drop for QuizDriver<Q, F> {
  fn drop(&mut self) {
    self.event_loop.abort();
  }
}

async fn run_loop<Q, F>(inner: Arc<Inner<Q, F>>, mut rx: mpsc::UnboundedReceiver<QuizEvent>)
where
  Q: QuestionProvider,
  F: FeedbackProvider,
{
  // The ticker handle lives in the loop; only effects touch it.
  let mut ticker: Option<JoinHandle<()>> = None;

  while let Some(event) = rx.recv().await {
    let effects = { inner.engine.write().await.apply(event) };
    for effect in effects {
      match effect {
        QuizEffect::FetchQuestions { generation, count } => {
          let inner = inner.clone();
          tokio::spawn(async move {
            let outcome = inner.questions.fetch_questions(count).await;
            let _ = inner.events.send(QuizEvent::QuestionsLoaded { generation, outcome });
          });
        }
        QuizEffect::FetchFeedback { generation, score, total } => {
          let inner = inner.clone();
          tokio::spawn(async move {
            let outcome = inner.feedback.fetch_feedback(score, total).await;
            let _ = inner.events.send(QuizEvent::FeedbackLoaded { generation, outcome });
          });
        }
        QuizEffect::StartTicker => {
          if let Some(handle) = ticker.take() {
            handle.abort();
          }
          let events = inner.events.clone();
          ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval fires immediately.
            interval.tick().await;
            loop {
              interval.tick().await;
              if events.send(QuizEvent::Tick).is_err() {
                break;
              }
            }
          }));
        }
        QuizEffect::StopTicker => {
          if let Some(handle) = ticker.take() {
            handle.abort();
          }
        }
        QuizEffect::ReportError { message } => {
          error!(target: "motionmaster_core", %message, "Provider error surfaced to the user");
        }
      }
    }
  }

  if let Some(handle) = ticker.take() {
    handle.abort();
  }
}
