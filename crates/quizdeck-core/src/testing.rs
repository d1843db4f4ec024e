//! Test helpers shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{AnswerValue, Filter, NewQuestionSet, Question, QuestionSetSummary};
use crate::traits::QuestionStore;

pub fn objective(answer: usize) -> Question {
    Question {
        question: format!("answer is {answer}"),
        choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        answer: AnswerValue::Choice(answer),
        ..Question::template()
    }
}

/// In-process store with optional latency and a switch to fail every call.
#[derive(Default)]
pub struct StubStore {
    sets: Mutex<HashMap<Filter, Vec<QuestionSetSummary>>>,
    questions: Mutex<HashMap<String, Vec<Question>>>,
    created: Mutex<Vec<NewQuestionSet>>,
    delay: Option<Duration>,
    fail: bool,
}

impl StubStore {
    pub fn with_set(id: &str, name: &str, questions: Vec<Question>) -> Self {
        let store = Self::default();
        store.add_set(Filter::default(), id, name, questions);
        store
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add_set(&self, filter: Filter, id: &str, name: &str, questions: Vec<Question>) {
        self.sets
            .lock()
            .unwrap()
            .entry(filter)
            .or_default()
            .push(QuestionSetSummary {
                id: id.into(),
                name: name.into(),
            });
        self.questions.lock().unwrap().insert(id.into(), questions);
    }

    pub fn created(&self) -> Vec<NewQuestionSet> {
        self.created.lock().unwrap().clone()
    }

    async fn pause(&self) -> anyhow::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(StoreError::NetworkError("connection refused".into()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for StubStore {
    fn name(&self) -> &str {
        "stub"
    }

    async fn list_question_sets(&self, filter: &Filter) -> anyhow::Result<Vec<QuestionSetSummary>> {
        self.pause().await?;
        Ok(self.sets.lock().unwrap().get(filter).cloned().unwrap_or_default())
    }

    async fn get_questions(&self, set_id: &str) -> anyhow::Result<Vec<Question>> {
        self.pause().await?;
        self.questions
            .lock()
            .unwrap()
            .get(set_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(set_id.to_string()).into())
    }

    async fn create_question_set(&self, set: &NewQuestionSet) -> anyhow::Result<String> {
        self.pause().await?;
        let mut created = self.created.lock().unwrap();
        created.push(set.clone());
        Ok(format!("created-{}", created.len()))
    }
}
