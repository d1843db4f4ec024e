//! Quiz session state machine.
//!
//! A session holds the questions of one loaded set, the user's answers
//! (index-aligned, initialized to the unset sentinel) and whether results are
//! revealed. Transitions:
//!
//! ```text
//! Empty --begin_load--> Loading --ok--> Loaded --submit--> Submitted
//!                          |
//!                          +--err--> Empty (error set)
//! ```
//!
//! Every `begin_load` or `reset` bumps a generation counter. A load that
//! finishes with an older generation is discarded.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SessionError, StoreError};
use crate::messages;
use crate::model::{AnswerValue, Question, QuestionSetSummary};
use crate::scoring::{self, ScoreCard};
use crate::traits::QuestionStore;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Empty,
    Loading,
    Loaded,
    Submitted,
}

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Ephemeral state for one quiz attempt.
#[derive(Debug)]
pub struct QuizSession {
    state: SessionState,
    set: Option<QuestionSetSummary>,
    questions: Vec<Question>,
    answers: Vec<AnswerValue>,
    error: Option<String>,
    generation: u64,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Empty,
            set: None,
            questions: Vec::new(),
            answers: Vec::new(),
            error: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The set being loaded or shown.
    pub fn set(&self) -> Option<&QuestionSetSummary> {
        self.set.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[AnswerValue] {
        &self.answers
    }

    /// User-facing error message from the last failed load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn results_revealed(&self) -> bool {
        self.state == SessionState::Submitted
    }

    /// Drop everything and return to `Empty`. In-flight loads become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::Empty;
        self.set = None;
        self.questions.clear();
        self.answers.clear();
        self.error = None;
        debug!(generation = self.generation, "session reset");
    }

    /// Enter `Loading` for `set` and hand out the ticket its response must carry.
    pub fn begin_load(&mut self, set: QuestionSetSummary) -> LoadTicket {
        self.generation += 1;
        self.state = SessionState::Loading;
        self.questions.clear();
        self.answers.clear();
        self.error = None;
        debug!(generation = self.generation, set = %set.id, "loading question set");
        self.set = Some(set);
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the outcome of a load started with `ticket`.
    ///
    /// Returns the number of questions loaded. A stale ticket leaves the
    /// session untouched. A failure or an empty set clears the session and
    /// records a user-facing error.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: anyhow::Result<Vec<Question>>,
    ) -> Result<usize, SessionError> {
        if ticket.generation != self.generation {
            warn!(
                got = ticket.generation,
                current = self.generation,
                "discarding stale question load"
            );
            return Err(SessionError::Stale {
                got: ticket.generation,
                current: self.generation,
            });
        }

        let failure = match result {
            Ok(questions) if !questions.is_empty() => {
                let count = questions.len();
                self.answers = vec![AnswerValue::unset(); count];
                self.questions = questions;
                self.state = SessionState::Loaded;
                self.error = None;
                debug!(count, "question set loaded");
                return Ok(count);
            }
            Ok(_) => SessionError::Load("question set is empty".into()),
            Err(e) => match e.downcast_ref::<StoreError>() {
                Some(StoreError::Timeout(secs)) => SessionError::Timeout(*secs),
                _ => SessionError::Load(format!("{e:#}")),
            },
        };

        warn!("question load failed: {failure}");
        self.state = SessionState::Empty;
        self.questions.clear();
        self.answers.clear();
        self.error = Some(messages::NOT_YET_AVAILABLE.to_string());
        Err(failure)
    }

    /// Fetch the questions of `set` from `store`, giving up after `timeout`.
    pub async fn load_set(
        &mut self,
        store: &dyn QuestionStore,
        set: QuestionSetSummary,
        timeout: Duration,
    ) -> Result<usize, SessionError> {
        let set_id = set.id.clone();
        let ticket = self.begin_load(set);
        let result = match tokio::time::timeout(timeout, store.get_questions(&set_id)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(timeout.as_secs()).into()),
        };
        self.finish_load(ticket, result)
    }

    /// Record an answer. Ignored once results are revealed, before anything
    /// is loaded, or for an index past the last question.
    pub fn record_answer(&mut self, index: usize, value: AnswerValue) -> bool {
        if self.state != SessionState::Loaded {
            return false;
        }
        match self.answers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Reveal results and freeze answers. Returns `false` if nothing changed.
    pub fn submit(&mut self) -> bool {
        if self.state != SessionState::Loaded {
            return false;
        }
        self.state = SessionState::Submitted;
        debug!("session submitted");
        true
    }

    pub fn score(&self) -> ScoreCard {
        scoring::score(&self.questions, &self.answers)
    }

    /// Whether the answer to question `index` is correct.
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        let question = self.questions.get(index)?;
        let answer = self.answers.get(index)?;
        Some(scoring::is_correct(question, answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{objective, StubStore};

    fn summary(id: &str, name: &str) -> QuestionSetSummary {
        QuestionSetSummary {
            id: id.into(),
            name: name.into(),
        }
    }

    fn loaded_session() -> QuizSession {
        let mut session = QuizSession::new();
        let ticket = session.begin_load(summary("s1", "중간1"));
        session
            .finish_load(ticket, Ok(vec![objective(1), objective(0), objective(2)]))
            .unwrap();
        session
    }

    #[test]
    fn load_initializes_unset_answers() {
        let session = loaded_session();
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.answers().len(), 3);
        assert!(session.answers().iter().all(AnswerValue::is_unset));
        assert!(!session.results_revealed());
        assert_eq!(session.set().unwrap().name, "중간1");
    }

    #[test]
    fn scenario_submit_then_score() {
        let mut session = loaded_session();
        assert!(session.record_answer(0, AnswerValue::Choice(1)));
        assert!(session.record_answer(1, AnswerValue::Choice(1)));
        assert!(session.record_answer(2, AnswerValue::Choice(2)));
        assert!(session.submit());

        let card = session.score();
        assert_eq!((card.correct, card.total), (2, 3));
        assert_eq!(card.percent(), 67);
        assert_eq!(session.is_correct(1), Some(false));
    }

    #[test]
    fn answers_frozen_after_submit() {
        let mut session = loaded_session();
        session.record_answer(0, AnswerValue::Choice(1));
        session.submit();
        let before = session.answers().to_vec();

        assert!(!session.record_answer(0, AnswerValue::Choice(2)));
        assert!(!session.record_answer(1, AnswerValue::Text("x".into())));
        assert_eq!(session.answers(), before.as_slice());
    }

    #[test]
    fn submit_is_idempotent() {
        let mut session = loaded_session();
        assert!(session.submit());
        assert!(!session.submit());
        assert_eq!(session.state(), SessionState::Submitted);
    }

    #[test]
    fn submit_requires_loaded_set() {
        let mut session = QuizSession::new();
        assert!(!session.submit());
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.score().percent(), 0);
    }

    #[test]
    fn record_answer_out_of_range_is_ignored() {
        let mut session = loaded_session();
        assert!(!session.record_answer(10, AnswerValue::Choice(0)));
        assert_eq!(session.answers().len(), 3);
    }

    #[test]
    fn failed_load_clears_and_flags() {
        let mut session = loaded_session();
        let ticket = session.begin_load(summary("s2", "기말"));
        let err = session
            .finish_load(ticket, Err(StoreError::NotFound("s2".into()).into()))
            .unwrap_err();
        assert!(matches!(err, SessionError::Load(_)));
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.questions().is_empty());
        assert!(session.answers().is_empty());
        assert_eq!(session.error(), Some(messages::NOT_YET_AVAILABLE));
    }

    #[test]
    fn empty_result_counts_as_failure() {
        let mut session = QuizSession::new();
        let ticket = session.begin_load(summary("s", "빈 세트"));
        assert!(session.finish_load(ticket, Ok(vec![])).is_err());
        assert!(session.has_error());
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut session = QuizSession::new();
        let first = session.begin_load(summary("a", "A"));
        let second = session.begin_load(summary("b", "B"));

        session.finish_load(second, Ok(vec![objective(0)])).unwrap();
        let err = session
            .finish_load(first, Ok(vec![objective(0), objective(1)]))
            .unwrap_err();

        assert!(matches!(err, SessionError::Stale { .. }));
        assert_eq!(session.questions().len(), 1);
        assert_eq!(session.set().unwrap().id, "b");
    }

    #[test]
    fn reset_makes_in_flight_load_stale() {
        let mut session = QuizSession::new();
        let ticket = session.begin_load(summary("a", "A"));
        session.reset();
        assert!(session.finish_load(ticket, Ok(vec![objective(0)])).is_err());
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.questions().is_empty());
    }

    #[test]
    fn reload_after_submit_hides_results() {
        let mut session = loaded_session();
        session.submit();
        let ticket = session.begin_load(summary("s1", "중간1"));
        session.finish_load(ticket, Ok(vec![objective(0)])).unwrap();
        assert!(!session.results_revealed());
        assert!(session.record_answer(0, AnswerValue::Choice(0)));
    }

    #[tokio::test]
    async fn load_set_from_store() {
        let store = StubStore::with_set("s1", "중간1", vec![objective(1), objective(0)]);
        let mut session = QuizSession::new();
        let count = session
            .load_set(&store, summary("s1", "중간1"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[tokio::test]
    async fn load_set_unknown_id_fails() {
        let store = StubStore::default();
        let mut session = QuizSession::new();
        let err = session
            .load_set(&store, summary("missing", "?"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(session.has_error());
    }

    #[tokio::test(start_paused = true)]
    async fn load_set_times_out() {
        let store = StubStore::with_set("s1", "중간1", vec![objective(0)])
            .with_delay(Duration::from_secs(60));
        let mut session = QuizSession::new();
        let err = session
            .load_set(&store, summary("s1", "중간1"), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Timeout(2)));
        assert_eq!(session.state(), SessionState::Empty);
    }
}
