//! Quiz result reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{Filter, QuestionType};
use crate::scoring::{self, ScoreCard};
use crate::session::{QuizSession, SessionState};

/// The outcome of one submitted quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the quiz was submitted.
    pub created_at: DateTime<Utc>,
    pub filter: Filter,
    /// Id of the question set taken.
    pub set_id: String,
    pub set_name: String,
    pub correct: usize,
    pub total: usize,
    /// Rounded percentage.
    pub percent: u32,
    /// Per-question review, in presentation order.
    pub items: Vec<ReviewItem>,
}

/// Review line for a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    /// One-based question number.
    pub number: usize,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub your_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub explanation: String,
}

impl QuizReport {
    /// Build a report from a submitted session.
    pub fn from_session(session: &QuizSession, filter: Filter) -> Result<Self, SessionError> {
        match session.state() {
            SessionState::Submitted => {}
            SessionState::Loaded => return Err(SessionError::NotSubmitted),
            SessionState::Empty | SessionState::Loading => return Err(SessionError::NotLoaded),
        }
        let set = session.set().ok_or(SessionError::NotLoaded)?;

        let items = session
            .questions()
            .iter()
            .zip(session.answers())
            .enumerate()
            .map(|(i, (q, given))| ReviewItem {
                number: i + 1,
                question: q.question.clone(),
                kind: q.kind,
                your_answer: if given.is_unset() {
                    String::new()
                } else {
                    q.render_answer(given)
                },
                correct_answer: q.correct_answer_text(),
                is_correct: scoring::is_correct(q, given),
                explanation: q.explanation.clone(),
            })
            .collect();

        let card = session.score();
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            filter,
            set_id: set.id.clone(),
            set_name: set.name.clone(),
            correct: card.correct,
            total: card.total,
            percent: card.percent(),
            items,
        })
    }

    pub fn score_card(&self) -> ScoreCard {
        ScoreCard {
            correct: self.correct,
            total: self.total,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Default file name: `<stem>_<timestamp>.json`.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.json",
            self.filter.stem(),
            self.created_at.format("%Y%m%dT%H%M%S")
        )
    }
}
