//! Quiz session orchestration.
//!
//! A [`QuizSession`] owns the state of one drill: the resolved question
//! list, the learner's position in it, the same-question streak, and the
//! accumulated score. The glue that every quiz mode needs lives here once;
//! the UI shell drives it through `current_question` / `choices` / `submit`
//! / `advance`.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::distractor::{distractors, shuffle_choices, ChoiceSet};
use crate::model::{
    AnswerField, HistoryScope, PoolType, QuestionPool, QuestionRecord, QuizSettings, RangeKey,
    ScoreEvent, ScoreHistoryEntry,
};
use crate::resolver::resolve;
use crate::scoring::score;

/// Tracks consecutive correct answers to the *same* question across retries.
#[derive(Debug, Default)]
struct StreakTracker {
    question_id: Option<String>,
    count: u32,
}

impl StreakTracker {
    /// Record an answer and return the streak value for scoring.
    fn on_answer(&mut self, question_id: &str, is_correct: bool) -> u32 {
        if !is_correct {
            self.question_id = None;
            self.count = 0;
            return 0;
        }
        if self.question_id.as_deref() == Some(question_id) {
            self.count += 1;
        } else {
            self.question_id = Some(question_id.to_string());
            self.count = 1;
        }
        self.count
    }
}

/// The result of one submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// Points awarded for this answer.
    pub points: u32,
    /// Streak value after this answer.
    pub streak: u32,
}

/// Final tallies of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub mode: PoolType,
    pub range: RangeKey,
    pub score: u32,
    /// Questions answered correctly on their first attempt.
    pub correct_count: u32,
    pub total_count: u32,
}

impl SessionSummary {
    /// The history scope this session's score belongs to.
    pub fn scope(&self) -> HistoryScope {
        HistoryScope::new(self.mode, self.range.clone())
    }

    /// Convert into a persistable leaderboard entry, stamped now.
    pub fn into_history_entry(self) -> ScoreHistoryEntry {
        ScoreHistoryEntry {
            score: self.score,
            correct_count: self.correct_count,
            total_count: self.total_count,
            recorded_at: Utc::now(),
        }
    }
}

/// One quiz session over a resolved slice of a question pool.
///
/// Question order is fixed for the session's lifetime; re-resolution only
/// happens by constructing a new session (e.g. advancing to the next batch
/// range). An empty resolved list is a valid session meaning "no next
/// range": it is finished from the start and never an error.
pub struct QuizSession {
    id: Uuid,
    mode: PoolType,
    settings: QuizSettings,
    field: AnswerField,
    pool: QuestionPool,
    questions: Vec<QuestionRecord>,
    position: usize,
    streak: StreakTracker,
    current_attempted: bool,
    correct_count: u32,
    total_score: u32,
}

impl QuizSession {
    /// Resolve the question list and start a session at its first question.
    pub fn new<R: Rng + ?Sized>(
        mode: PoolType,
        pool: QuestionPool,
        settings: QuizSettings,
        field: AnswerField,
        rng: &mut R,
    ) -> Self {
        let questions = resolve(&pool, &settings, rng);
        let id = Uuid::new_v4();
        tracing::debug!(
            session = %id,
            %mode,
            questions = questions.len(),
            "session started"
        );
        Self {
            id,
            mode,
            settings,
            field,
            pool,
            questions,
            position: 0,
            streak: StreakTracker::default(),
            current_attempted: false,
            correct_count: 0,
            total_score: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// The question currently presented, or `None` once finished.
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.position)
    }

    /// 0-based position of the current question.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.questions.len()
    }

    /// Build a shuffled multiple-choice set for the current question, with
    /// up to `k` distractors drawn from the full pool.
    pub fn choices<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Option<ChoiceSet> {
        let question = self.current_question()?;
        let wrong = distractors(question, &self.pool, self.field, k, rng);
        Some(shuffle_choices(question.field(self.field), &wrong, rng))
    }

    /// Submit an answer for the current question.
    ///
    /// Does not advance: the caller may let the learner retry, which feeds
    /// the streak but not the first-attempt tallies. Returns `None` when
    /// the session is already finished.
    pub fn submit(&mut self, answer: &str, elapsed: Duration) -> Option<AnswerOutcome> {
        let question = self.questions.get(self.position)?;
        let is_correct = answer.trim() == question.field(self.field);
        let streak = self.streak.on_answer(&question.id, is_correct);

        let event = ScoreEvent {
            is_correct,
            elapsed_ms: elapsed.as_millis() as u64,
            streak,
            shuffle_active: self.settings.shuffle_active(),
        };
        let points = score(&event);
        self.total_score += points;

        if !self.current_attempted {
            self.current_attempted = true;
            if is_correct {
                self.correct_count += 1;
            }
        }

        tracing::debug!(
            session = %self.id,
            question = %question.id,
            is_correct,
            points,
            streak,
            "answer submitted"
        );

        Some(AnswerOutcome {
            is_correct,
            points,
            streak,
        })
    }

    /// Move to the next question. Returns `true` while questions remain.
    pub fn advance(&mut self) -> bool {
        if self.position < self.questions.len() {
            self.position += 1;
            self.current_attempted = false;
        }
        !self.is_finished()
    }

    /// The session's final tallies. Meaningful at any point, but intended
    /// for a finished session.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            mode: self.mode,
            range: self.settings.range_key(),
            score: self.total_score,
            correct_count: self.correct_count,
            total_count: self.questions.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BatchSize, CountMode, OrderMode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> QuestionPool {
        QuestionPool::new(
            (0..5)
                .map(|i| QuestionRecord {
                    id: format!("q-{i}"),
                    name: format!("Compound {i}"),
                    answer: format!("F{i}"),
                    family: None,
                    tags: vec![],
                })
                .collect(),
        )
    }

    fn sequential_all() -> QuizSettings {
        QuizSettings {
            count: CountMode::All { count: None },
            order: OrderMode::Sequential,
        }
    }

    fn new_session(settings: QuizSettings) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(1);
        QuizSession::new(
            PoolType::Compounds,
            pool(),
            settings,
            AnswerField::Answer,
            &mut rng,
        )
    }

    #[test]
    fn walks_questions_in_order() {
        let mut session = new_session(sequential_all());
        assert_eq!(session.question_count(), 5);
        for i in 0..5 {
            assert_eq!(session.current_question().unwrap().id, format!("q-{i}"));
            session.submit(&format!("F{i}"), Duration::from_secs(1));
            session.advance();
        }
        assert!(session.is_finished());
        assert!(session.current_question().is_none());
    }

    #[test]
    fn correct_answer_scores_and_tallies() {
        let mut session = new_session(sequential_all());
        let outcome = session.submit("F0", Duration::from_secs(2)).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.points, 900);
        assert_eq!(outcome.streak, 1);
        assert_eq!(session.summary().correct_count, 1);
        assert_eq!(session.summary().score, 900);
    }

    #[test]
    fn wrong_answer_scores_zero() {
        let mut session = new_session(sequential_all());
        let outcome = session.submit("XYZ", Duration::from_secs(1)).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.streak, 0);
        assert_eq!(session.summary().correct_count, 0);
    }

    #[test]
    fn answer_comparison_trims_whitespace() {
        let mut session = new_session(sequential_all());
        let outcome = session.submit("  F0  ", Duration::from_secs(1)).unwrap();
        assert!(outcome.is_correct);
    }

    #[test]
    fn streak_builds_on_same_question_retries() {
        let mut session = new_session(sequential_all());
        let first = session.submit("F0", Duration::from_secs(2)).unwrap();
        let second = session.submit("F0", Duration::from_secs(2)).unwrap();
        let third = session.submit("F0", Duration::from_secs(2)).unwrap();
        assert_eq!(first.streak, 1);
        assert_eq!(second.streak, 2);
        assert_eq!(third.streak, 3);
        assert!(third.points > first.points);
    }

    #[test]
    fn streak_resets_on_wrong_answer() {
        let mut session = new_session(sequential_all());
        session.submit("F0", Duration::from_secs(1));
        session.submit("F0", Duration::from_secs(1));
        let wrong = session.submit("nope", Duration::from_secs(1)).unwrap();
        assert_eq!(wrong.streak, 0);
        let again = session.submit("F0", Duration::from_secs(1)).unwrap();
        assert_eq!(again.streak, 1);
    }

    #[test]
    fn streak_resets_when_question_changes() {
        let mut session = new_session(sequential_all());
        session.submit("F0", Duration::from_secs(1));
        session.submit("F0", Duration::from_secs(1));
        session.advance();
        let next = session.submit("F1", Duration::from_secs(1)).unwrap();
        assert_eq!(next.streak, 1);
    }

    #[test]
    fn retries_do_not_inflate_first_attempt_tallies() {
        let mut session = new_session(sequential_all());
        session.submit("wrong", Duration::from_secs(1));
        session.submit("F0", Duration::from_secs(1));
        session.submit("F0", Duration::from_secs(1));
        let summary = session.summary();
        // First attempt was wrong; later retries still score points.
        assert_eq!(summary.correct_count, 0);
        assert!(summary.score > 0);
    }

    #[test]
    fn shuffle_flag_feeds_scoring() {
        let settings = QuizSettings {
            count: CountMode::All { count: None },
            order: OrderMode::Shuffle,
        };
        let mut session = new_session(settings);
        let answer = session.current_question().unwrap().answer.clone();
        let outcome = session.submit(&answer, Duration::from_secs(2)).unwrap();
        assert_eq!(outcome.points, 1350);
    }

    #[test]
    fn out_of_range_batch_is_a_finished_session() {
        let settings = QuizSettings {
            count: CountMode::Batch {
                size: BatchSize::Ten,
                start: 31,
            },
            order: OrderMode::Sequential,
        };
        let session = new_session(settings);
        assert!(session.is_finished());
        assert_eq!(session.question_count(), 0);
        assert_eq!(session.summary().total_count, 0);
    }

    #[test]
    fn choices_cover_current_question() {
        let session = new_session(sequential_all());
        let mut rng = StdRng::seed_from_u64(2);
        let set = session.choices(3, &mut rng).unwrap();
        assert_eq!(set.choices.len(), 4);
        assert_eq!(set.choices[set.correct_index], "F0");
    }

    #[test]
    fn summary_converts_to_history_entry() {
        let mut session = new_session(sequential_all());
        session.submit("F0", Duration::from_secs(1));
        let summary = session.summary();
        assert_eq!(summary.range.as_str(), "all:*");
        let entry = summary.clone().into_history_entry();
        assert_eq!(entry.score, summary.score);
        assert_eq!(entry.correct_count, 1);
        assert_eq!(entry.total_count, 5);
    }

    #[test]
    fn submit_after_finish_returns_none() {
        let mut session = new_session(sequential_all());
        while session.advance() {}
        assert!(session.submit("F0", Duration::from_secs(1)).is_none());
    }
}
