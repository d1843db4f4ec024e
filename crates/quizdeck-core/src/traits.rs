//! Core trait definitions for question stores.
//!
//! The store is the remote document store the quiz and authoring flows talk
//! to. Implementations live in the `quizdeck-store` crate.

use async_trait::async_trait;

use crate::model::{Filter, NewQuestionSet, Question, QuestionSetSummary};

/// Trait for backends that persist question sets.
///
/// Failures are reported as `anyhow::Error` wrapping a
/// [`StoreError`](crate::error::StoreError) where the cause is known.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Human-readable store name (e.g. "http").
    fn name(&self) -> &str;

    /// List the sets visible under a filter.
    async fn list_question_sets(&self, filter: &Filter) -> anyhow::Result<Vec<QuestionSetSummary>>;

    /// Fetch the questions of one set, in presentation order.
    async fn get_questions(&self, set_id: &str) -> anyhow::Result<Vec<Question>>;

    /// Persist a new set and return the id the store assigned to it.
    async fn create_question_set(&self, set: &NewQuestionSet) -> anyhow::Result<String>;
}
