//! Quiz view state: the active filter, the sets it offers, and the session.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{SessionError, StoreError};
use crate::messages;
use crate::model::{Filter, QuestionSetSummary};
use crate::session::QuizSession;
use crate::traits::QuestionStore;

/// Default time to wait for a store response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// State container for the quiz-taking flow.
///
/// Owns the filter, the question sets available under it, and the session.
/// Changing the filter discards the session.
#[derive(Debug)]
pub struct QuizContext {
    filter: Filter,
    available_sets: Vec<QuestionSetSummary>,
    sets_error: Option<String>,
    session: QuizSession,
    timeout: Duration,
}

impl Default for QuizContext {
    fn default() -> Self {
        Self::new(Filter::default())
    }
}

impl QuizContext {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            available_sets: Vec::new(),
            sets_error: None,
            session: QuizSession::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn available_sets(&self) -> &[QuestionSetSummary] {
        &self.available_sets
    }

    /// User-facing message from the last set listing, if it failed.
    pub fn sets_error(&self) -> Option<&str> {
        self.sets_error.as_deref()
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    /// Switch filters. Returns `false` when `filter` is already active.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.available_sets.clear();
        self.sets_error = None;
        self.session.reset();
        true
    }

    /// List the sets for the current filter.
    ///
    /// A failure or an empty listing leaves the list empty and records the
    /// "not yet available" message; nothing is returned as an error.
    pub async fn refresh_sets(&mut self, store: &dyn QuestionStore) -> &[QuestionSetSummary] {
        let listed = match tokio::time::timeout(self.timeout, store.list_question_sets(&self.filter))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout.as_secs()).into()),
        };

        match listed {
            Ok(sets) if !sets.is_empty() => {
                info!(filter = %self.filter, count = sets.len(), "question sets listed");
                self.available_sets = sets;
                self.sets_error = None;
            }
            Ok(_) => {
                self.available_sets.clear();
                self.sets_error = Some(messages::NOT_YET_AVAILABLE.to_string());
            }
            Err(e) => {
                warn!(filter = %self.filter, "failed to list question sets: {e:#}");
                self.available_sets.clear();
                self.sets_error = Some(messages::NOT_YET_AVAILABLE.to_string());
            }
        }

        &self.available_sets
    }

    /// Find an available set by id, or else by exact name.
    pub fn find_set(&self, key: &str) -> Option<&QuestionSetSummary> {
        self.available_sets
            .iter()
            .find(|s| s.id == key)
            .or_else(|| self.available_sets.iter().find(|s| s.name == key))
    }

    /// Load the set identified by `key` into the session.
    pub async fn select_set(
        &mut self,
        store: &dyn QuestionStore,
        key: &str,
    ) -> Result<usize, SessionError> {
        let set = self
            .find_set(key)
            .cloned()
            .ok_or_else(|| SessionError::UnknownSet(key.to_string()))?;
        self.session.load_set(store, set, self.timeout).await
    }
}
