//! Quiz lifecycle state machine.
//!
//! The engine is pure: `apply` consumes one event and returns the effects
//! the caller must execute (provider fetches, ticker control). It performs
//! no IO and has no internal clock, so every transition is deterministic.
//!
//! Lifecycle:
//!
//! ```text
//! Idle -> Loading -> Active -> Loading -> Finished -> Idle
//!           |                                 |
//!           +--> Idle (fetch failure)         +--> Loading (restart)
//! ```
//!
//! Provider results arrive as events tagged with the generation they were
//! requested under. A mismatched generation means the session moved on in
//! the meantime (reset, restart) and the event is dropped, so a stale
//! response can never clobber newer state.

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::domain::{Question, QuizStatus, OPTION_COUNT};
use crate::error::ProviderError;
use crate::util::accuracy_pct;

/// One run of the quiz. Cloned out as a snapshot for rendering.
#[derive(Clone, Debug, Serialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub questions: Vec<Question>,
    pub current_index: usize,
    /// One slot per question; `None` until the user picks an option.
    pub answers: Vec<Option<usize>>,
    /// Meaningless until status is `Finished`.
    pub score: usize,
    pub time_left: u32,
    pub status: QuizStatus,
    pub feedback: Option<String>,
}

impl QuizSession {
    fn fresh(config: &QuizConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            questions: Vec::new(),
            current_index: 0,
            answers: vec![None; config.quiz.total_questions],
            score: 0,
            time_left: config.quiz.duration_secs,
            status: QuizStatus::Idle,
            feedback: None,
        }
    }
}

/// Inputs the engine reacts to: user actions, timer ticks, and resolved
/// provider calls tagged with the generation they were requested under.
#[derive(Debug)]
pub enum QuizEvent {
    StartRequested,
    QuestionsLoaded {
        generation: u64,
        outcome: Result<Vec<Question>, ProviderError>,
    },
    AnswerSelected {
        option: usize,
    },
    NextRequested,
    PrevRequested,
    Tick,
    FeedbackLoaded {
        generation: u64,
        outcome: Result<String, ProviderError>,
    },
    ResetRequested,
}

/// Work the caller must carry out after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEffect {
    FetchQuestions { generation: u64, count: usize },
    FetchFeedback { generation: u64, score: usize, total: usize },
    StartTicker,
    StopTicker,
    ReportError { message: String },
}

/// Which provider response the engine is waiting for, if any.
/// Entering `Loading` always sets exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Questions,
    Feedback,
}

pub struct QuizEngine {
    config: QuizConfig,
    session: QuizSession,
    generation: u64,
    pending: Option<Pending>,
    last_error: Option<String>,
}

impl QuizEngine {
    pub fn new(config: QuizConfig) -> Self {
        let session = QuizSession::fresh(&config);
        Self {
            config,
            session,
            generation: 0,
            pending: None,
            last_error: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn status(&self) -> QuizStatus {
        self.session.status
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Error from the most recent failed question fetch, cleared on the
    /// next start attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.questions.get(self.session.current_index)
    }

    /// Forward navigation is gated on the current slot being answered.
    pub fn can_advance(&self) -> bool {
        self.session.status == QuizStatus::Active
            && self
                .session
                .answers
                .get(self.session.current_index)
                .copied()
                .flatten()
                .is_some()
    }

    /// Whole-percent accuracy of the finished session.
    pub fn accuracy(&self) -> u32 {
        accuracy_pct(self.session.score, self.session.questions.len())
    }

    /// Seconds spent before the quiz ended.
    pub fn time_used(&self) -> u32 {
        self.config.quiz.duration_secs.saturating_sub(self.session.time_left)
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub fn apply(&mut self, event: QuizEvent) -> Vec<QuizEffect> {
        match event {
            QuizEvent::StartRequested => self.on_start(),
            QuizEvent::QuestionsLoaded { generation, outcome } => {
                self.on_questions(generation, outcome)
            }
            QuizEvent::AnswerSelected { option } => self.on_answer(option),
            QuizEvent::NextRequested => self.on_next(),
            QuizEvent::PrevRequested => self.on_prev(),
            QuizEvent::Tick => self.on_tick(),
            QuizEvent::FeedbackLoaded { generation, outcome } => {
                self.on_feedback(generation, outcome)
            }
            QuizEvent::ResetRequested => self.on_reset(),
        }
    }

    fn on_start(&mut self) -> Vec<QuizEffect> {
        match self.session.status {
            QuizStatus::Idle | QuizStatus::Finished => {
                self.generation += 1;
                self.pending = Some(Pending::Questions);
                self.last_error = None;
                self.session.status = QuizStatus::Loading;
                info!(
                    target: "quiz",
                    session = %self.session.id,
                    generation = self.generation,
                    "Start requested; fetching questions"
                );
                vec![QuizEffect::FetchQuestions {
                    generation: self.generation,
                    count: self.config.quiz.total_questions,
                }]
            }
            _ => {
                debug!(target: "quiz", status = ?self.session.status, "Start ignored");
                Vec::new()
            }
        }
    }

    fn on_questions(
        &mut self,
        generation: u64,
        outcome: Result<Vec<Question>, ProviderError>,
    ) -> Vec<QuizEffect> {
        if generation != self.generation || self.pending != Some(Pending::Questions) {
            warn!(
                target: "quiz",
                generation,
                current = self.generation,
                "Dropping stale question batch"
            );
            return Vec::new();
        }
        self.pending = None;
        match outcome {
            Ok(questions) if questions.len() == self.config.quiz.total_questions => {
                let count = questions.len();
                self.session = QuizSession {
                    id: Uuid::new_v4(),
                    questions,
                    current_index: 0,
                    answers: vec![None; count],
                    score: 0,
                    time_left: self.config.quiz.duration_secs,
                    status: QuizStatus::Active,
                    feedback: None,
                };
                info!(target: "quiz", session = %self.session.id, count, "Questions loaded; quiz active");
                vec![QuizEffect::StartTicker]
            }
            Ok(questions) => {
                // The provider validates the batch too; this is the engine's
                // own count re-check.
                self.fail_to_idle(format!(
                    "expected {} questions, got {}",
                    self.config.quiz.total_questions,
                    questions.len()
                ))
            }
            Err(e) => self.fail_to_idle(e.to_string()),
        }
    }

    fn fail_to_idle(&mut self, message: String) -> Vec<QuizEffect> {
        error!(target: "quiz", error = %message, "Question fetch failed; returning to idle");
        self.session.status = QuizStatus::Idle;
        self.last_error = Some(message.clone());
        vec![QuizEffect::ReportError { message }]
    }

    fn on_answer(&mut self, option: usize) -> Vec<QuizEffect> {
        if self.session.status != QuizStatus::Active {
            return Vec::new();
        }
        if option >= OPTION_COUNT {
            warn!(target: "quiz", option, "Answer option out of range; ignored");
            return Vec::new();
        }
        let index = self.session.current_index;
        // Last write wins; other slots are untouched.
        self.session.answers[index] = Some(option);
        debug!(target: "quiz", question = index, option, "Answer recorded");
        Vec::new()
    }

    fn on_next(&mut self) -> Vec<QuizEffect> {
        if self.session.status != QuizStatus::Active {
            return Vec::new();
        }
        if !self.can_advance() {
            debug!(
                target: "quiz",
                index = self.session.current_index,
                "Next blocked: current question unanswered"
            );
            return Vec::new();
        }
        if self.session.current_index + 1 < self.session.questions.len() {
            self.session.current_index += 1;
            Vec::new()
        } else {
            self.finish()
        }
    }

    fn on_prev(&mut self) -> Vec<QuizEffect> {
        if self.session.status == QuizStatus::Active && self.session.current_index > 0 {
            self.session.current_index -= 1;
        }
        Vec::new()
    }

    fn on_tick(&mut self) -> Vec<QuizEffect> {
        if self.session.status != QuizStatus::Active {
            return Vec::new();
        }
        self.session.time_left = self.session.time_left.saturating_sub(1);
        if self.session.time_left == 0 {
            info!(target: "quiz", session = %self.session.id, "Time expired; finishing");
            return self.finish();
        }
        Vec::new()
    }

    /// Score the slots as they stand and move to the feedback fetch.
    /// The score is fixed here; later events cannot change it.
    fn finish(&mut self) -> Vec<QuizEffect> {
        let score = self
            .session
            .questions
            .iter()
            .zip(self.session.answers.iter())
            .filter(|(q, a)| **a == Some(q.correct_answer))
            .count();
        self.session.score = score;
        self.session.status = QuizStatus::Loading;
        self.generation += 1;
        self.pending = Some(Pending::Feedback);
        let total = self.session.questions.len();
        info!(target: "quiz", session = %self.session.id, score, total, "Quiz finished; fetching feedback");
        vec![
            QuizEffect::StopTicker,
            QuizEffect::FetchFeedback {
                generation: self.generation,
                score,
                total,
            },
        ]
    }

    fn on_feedback(
        &mut self,
        generation: u64,
        outcome: Result<String, ProviderError>,
    ) -> Vec<QuizEffect> {
        if generation != self.generation || self.pending != Some(Pending::Feedback) {
            warn!(
                target: "quiz",
                generation,
                current = self.generation,
                "Dropping stale feedback"
            );
            return Vec::new();
        }
        self.pending = None;
        let feedback = match outcome {
            Ok(text) => text,
            Err(e) => {
                error!(target: "quiz", error = %e, "Feedback fetch failed; using fallback text");
                self.config.fallback_feedback.clone()
            }
        };
        self.session.feedback = Some(feedback);
        self.session.status = QuizStatus::Finished;
        info!(
            target: "quiz",
            session = %self.session.id,
            score = self.session.score,
            accuracy = self.accuracy(),
            "Feedback ready"
        );
        Vec::new()
    }

    fn on_reset(&mut self) -> Vec<QuizEffect> {
        self.generation += 1;
        self.pending = None;
        self.last_error = None;
        self.session = QuizSession::fresh(&self.config);
        info!(target: "quiz", session = %self.session.id, "Session reset to idle");
        vec![QuizEffect::StopTicker]
    }
}
