//! End-to-end driver flows with in-memory providers: the full
//! start/answer/finish path, provider failures, and stale-response
//! rejection after a mid-fetch reset.

use std::time::Duration;

use motionmaster_core::{
    FeedbackProvider, ProviderError, Question, QuestionProvider, QuizConfig, QuizDriver,
    QuizParams, QuizSession, QuizStatus,
};

fn config(total_questions: usize, duration_secs: u32) -> QuizConfig {
    QuizConfig {
        quiz: QuizParams { total_questions, duration_secs },
        ..QuizConfig::default()
    }
}

/// Questions where question i's correct option is i % 4.
struct FixedQuestions;

impl QuestionProvider for FixedQuestions {
    async fn fetch_questions(&self, count: usize) -> Result<Vec<Question>, ProviderError> {
        Ok((0..count)
            .map(|i| Question {
                id: i as i64,
                question: format!("Scenario {i}: find the final velocity."),
                options: vec!["5 m/s".into(), "10 m/s".into(), "15 m/s".into(), "20 m/s".into()],
                correct_answer: i % 4,
                explanation: "Apply v = u + at.".into(),
            })
            .collect())
    }
}

struct FailingQuestions;

impl QuestionProvider for FailingQuestions {
    async fn fetch_questions(&self, _count: usize) -> Result<Vec<Question>, ProviderError> {
        Err(ProviderError::EmptyResponse)
    }
}

/// Resolves successfully, but only after a delay; lets tests reset first.
struct SlowQuestions;

impl QuestionProvider for SlowQuestions {
    async fn fetch_questions(&self, count: usize) -> Result<Vec<Question>, ProviderError> {
        tokio::time::sleep(Duration::from_millis(150)).await;
        FixedQuestions.fetch_questions(count).await
    }
}

struct CannedFeedback;

impl FeedbackProvider for CannedFeedback {
    async fn fetch_feedback(&self, score: usize, total: usize) -> Result<String, ProviderError> {
        Ok(format!("You scored {score} of {total}. Solid grasp of kinematics."))
    }
}

struct FailingFeedback;

impl FeedbackProvider for FailingFeedback {
    async fn fetch_feedback(&self, _score: usize, _total: usize) -> Result<String, ProviderError> {
        Err(ProviderError::EmptyResponse)
    }
}

async fn wait_for_status<Q, F>(driver: &QuizDriver<Q, F>, want: QuizStatus) -> QuizSession
where
    Q: QuestionProvider,
    F: FeedbackProvider,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let snap = driver.snapshot().await;
            if snap.status == want {
                return snap;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("driver never reached {want:?}"))
}

#[tokio::test]
async fn full_quiz_reaches_finished_with_the_expected_score() {
    let driver = QuizDriver::new(config(3, 300), FixedQuestions, CannedFeedback);

    driver.start_quiz();
    let snap = wait_for_status(&driver, QuizStatus::Active).await;
    assert_eq!(snap.questions.len(), 3);
    assert_eq!(snap.answers, vec![None, None, None]);

    // correct (0), wrong (3 instead of 1), correct (2)
    driver.select_answer(0);
    driver.next_question();
    driver.select_answer(3);
    driver.next_question();
    driver.select_answer(2);
    driver.next_question();

    let snap = wait_for_status(&driver, QuizStatus::Finished).await;
    assert_eq!(snap.score, 2);
    assert_eq!(snap.answers, vec![Some(0), Some(3), Some(2)]);
    assert_eq!(
        snap.feedback.as_deref(),
        Some("You scored 2 of 3. Solid grasp of kinematics.")
    );
}

#[tokio::test]
async fn question_failure_returns_to_idle_with_an_error() {
    let driver = QuizDriver::new(config(3, 300), FailingQuestions, CannedFeedback);

    driver.start_quiz();
    let error = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Some(e) = driver.last_error().await {
                return e;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("error never surfaced");

    assert!(error.contains("empty response"), "got: {error}");
    let snap = driver.snapshot().await;
    assert_eq!(snap.status, QuizStatus::Idle);
    assert!(snap.questions.is_empty());
}

#[tokio::test]
async fn feedback_failure_still_finishes_with_fallback_text() {
    let cfg = config(2, 300);
    let fallback = cfg.fallback_feedback.clone();
    let driver = QuizDriver::new(cfg, FixedQuestions, FailingFeedback);

    driver.start_quiz();
    wait_for_status(&driver, QuizStatus::Active).await;

    driver.select_answer(0);
    driver.next_question();
    driver.select_answer(0);
    driver.next_question();

    let snap = wait_for_status(&driver, QuizStatus::Finished).await;
    assert_eq!(snap.score, 1);
    assert_eq!(snap.feedback.as_deref(), Some(fallback.as_str()));
}

#[tokio::test]
async fn reset_before_the_batch_arrives_orphans_it() {
    let driver = QuizDriver::new(config(3, 300), SlowQuestions, CannedFeedback);

    driver.start_quiz();
    tokio::time::sleep(Duration::from_millis(20)).await;
    driver.reset();

    // Give the slow fetch time to resolve; its batch must be dropped.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let snap = driver.snapshot().await;
    assert_eq!(snap.status, QuizStatus::Idle);
    assert!(snap.questions.is_empty());
}

#[tokio::test]
async fn restart_from_finished_runs_a_second_session() {
    let driver = QuizDriver::new(config(1, 300), FixedQuestions, CannedFeedback);

    driver.start_quiz();
    wait_for_status(&driver, QuizStatus::Active).await;
    driver.select_answer(0);
    driver.next_question();
    let first = wait_for_status(&driver, QuizStatus::Finished).await;
    assert_eq!(first.score, 1);

    driver.start_quiz();
    let snap = wait_for_status(&driver, QuizStatus::Active).await;
    assert_ne!(snap.id, first.id);
    assert_eq!(snap.answers, vec![None]);
    assert_eq!(snap.feedback, None);
}
