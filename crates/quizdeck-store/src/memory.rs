//! In-memory store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizdeck_core::error::StoreError;
use quizdeck_core::model::{Filter, NewQuestionSet, Question, QuestionSetSummary};
use quizdeck_core::traits::QuestionStore;

#[derive(Default)]
struct Inner {
    sets: Vec<(Filter, QuestionSetSummary)>,
    questions: HashMap<String, Vec<Question>>,
    next_id: u32,
}

/// A question store kept entirely in memory.
///
/// Counts calls and can be switched into a failing mode to exercise error
/// paths without a network.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    list_calls: AtomicU32,
    get_calls: AtomicU32,
    create_calls: AtomicU32,
    fail: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a set and return its id.
    pub fn insert(&self, filter: Filter, name: &str, questions: Vec<Question>) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner.sets.push((
            filter,
            QuestionSetSummary {
                id: id.clone(),
                name: name.to_string(),
            },
        ));
        inner.questions.insert(id.clone(), questions);
        id
    }

    /// Make every following call fail with a network error (or stop failing).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::Relaxed)
    }

    pub fn get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::Relaxed)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::Relaxed)
    }

    /// Number of sets currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(StoreError::NetworkError("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_question_sets(&self, filter: &Filter) -> anyhow::Result<Vec<QuestionSetSummary>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sets
            .iter()
            .filter(|(f, _)| f == filter)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn get_questions(&self, set_id: &str) -> anyhow::Result<Vec<Question>> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        let inner = self.inner.lock().unwrap();
        inner
            .questions
            .get(set_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(set_id.to_string()).into())
    }

    async fn create_question_set(&self, set: &NewQuestionSet) -> anyhow::Result<String> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        Ok(self.insert(set.filter(), &set.name, set.questions.clone()))
    }
}
