//! Authoring: an editable, ordered list of draft questions.
//!
//! Indices are zero-based. Out-of-range question indices are errors except
//! in [`Draft::remove_question`], which ignores them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DraftError;
use crate::image;
use crate::model::{
    AnswerValue, Filter, NewQuestionSet, Question, QuestionType, DEFAULT_CHOICE_COUNT,
    MIN_CHOICE_COUNT,
};
use crate::traits::QuestionStore;

/// Exported draft document: `{title, list}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedDraft {
    pub title: String,
    pub list: Vec<Question>,
}

/// A single editable field of a draft question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    PassageTitle,
    Passage,
    Question,
    Answer,
    Explanation,
    Type,
    Image,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftField::PassageTitle => "passageTitle",
            DraftField::Passage => "passage",
            DraftField::Question => "question",
            DraftField::Answer => "answer",
            DraftField::Explanation => "explanation",
            DraftField::Type => "type",
            DraftField::Image => "image",
        };
        f.write_str(name)
    }
}

impl FromStr for DraftField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "passagetitle" => Ok(DraftField::PassageTitle),
            "passage" => Ok(DraftField::Passage),
            "question" => Ok(DraftField::Question),
            "answer" => Ok(DraftField::Answer),
            "explanation" => Ok(DraftField::Explanation),
            "type" => Ok(DraftField::Type),
            "image" => Ok(DraftField::Image),
            _ => Err(DraftError::UnknownField(s.to_string())),
        }
    }
}

/// The in-progress list of questions being authored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    title: String,
    questions: Vec<Question>,
}

impl Draft {
    /// An empty draft with no title and no questions.
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft holding one template question, ready for editing.
    pub fn with_template_question() -> Self {
        let mut draft = Self::new();
        draft.add_question();
        draft
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut Question, DraftError> {
        let len = self.questions.len();
        self.questions
            .get_mut(index)
            .ok_or(DraftError::QuestionOutOfRange { index, len })
    }

    /// Append a template question. Returns the new length.
    pub fn add_question(&mut self) -> usize {
        self.questions.push(Question::template());
        self.questions.len()
    }

    /// Remove the question at `index`. Returns `false` if it did not exist.
    pub fn remove_question(&mut self, index: usize) -> bool {
        if index < self.questions.len() {
            self.questions.remove(index);
            true
        } else {
            false
        }
    }

    /// Set one field of the question at `index`.
    ///
    /// `answer` is coerced to a choice index for objective questions and
    /// stored as text for subjective ones. Switching `type` converts the
    /// answer to match the new type.
    pub fn update_field(
        &mut self,
        index: usize,
        field: DraftField,
        value: &str,
    ) -> Result<(), DraftError> {
        let q = self.question_mut(index)?;
        match field {
            DraftField::PassageTitle => q.passage_title = value.to_string(),
            DraftField::Passage => q.passage = value.to_string(),
            DraftField::Question => q.question = value.to_string(),
            DraftField::Explanation => q.explanation = value.to_string(),
            DraftField::Image => q.image = value.to_string(),
            DraftField::Answer => match q.kind {
                QuestionType::Objective => {
                    let choice: usize = value
                        .trim()
                        .parse()
                        .map_err(|_| DraftError::InvalidAnswer(value.to_string()))?;
                    if choice >= q.choices.len() {
                        return Err(DraftError::ChoiceOutOfRange {
                            index: choice,
                            len: q.choices.len(),
                        });
                    }
                    q.answer = AnswerValue::Choice(choice);
                }
                QuestionType::Subjective => q.answer = AnswerValue::Text(value.to_string()),
            },
            DraftField::Type => {
                let kind: QuestionType = value
                    .parse()
                    .map_err(|_| DraftError::InvalidType(value.to_string()))?;
                set_kind(q, kind);
            }
        }
        Ok(())
    }

    /// Replace choice `choice` of question `index`.
    pub fn update_choice(
        &mut self,
        index: usize,
        choice: usize,
        value: &str,
    ) -> Result<(), DraftError> {
        let q = self.question_mut(index)?;
        let len = q.choices.len();
        let slot = q
            .choices
            .get_mut(choice)
            .ok_or(DraftError::ChoiceOutOfRange { index: choice, len })?;
        *slot = value.to_string();
        Ok(())
    }

    /// Append an empty choice. Returns the new choice count.
    pub fn add_choice(&mut self, index: usize) -> Result<usize, DraftError> {
        let q = self.question_mut(index)?;
        q.choices.push(String::new());
        Ok(q.choices.len())
    }

    /// Remove a choice, keeping the answer pointed at the same choice.
    ///
    /// Removing the answered choice resets the answer to 0. The last
    /// remaining choice cannot be removed.
    pub fn remove_choice(&mut self, index: usize, choice: usize) -> Result<(), DraftError> {
        let q = self.question_mut(index)?;
        let len = q.choices.len();
        if choice >= len {
            return Err(DraftError::ChoiceOutOfRange { index: choice, len });
        }
        if len <= MIN_CHOICE_COUNT {
            return Err(DraftError::LastChoice);
        }

        q.choices.remove(choice);
        if let AnswerValue::Choice(answer) = &mut q.answer {
            if choice < *answer {
                *answer -= 1;
            } else if choice == *answer {
                *answer = 0;
            }
            if *answer >= q.choices.len() {
                *answer = 0;
            }
        }
        Ok(())
    }

    /// Read an image file and store it on question `index` as a data URI.
    ///
    /// The field is only written once the file has been read and encoded.
    pub async fn attach_image(&mut self, index: usize, path: &Path) -> Result<(), DraftError> {
        self.question_mut(index)?;
        let uri = image::read_data_uri(path).await?;
        self.question_mut(index)?.image = uri;
        Ok(())
    }

    pub fn clear_image(&mut self, index: usize) -> Result<(), DraftError> {
        self.question_mut(index)?.image.clear();
        Ok(())
    }

    pub fn export_draft(&self) -> ExportedDraft {
        ExportedDraft {
            title: self.title.clone(),
            list: self.questions.clone(),
        }
    }

    /// Pretty-printed export document.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export_draft()).context("failed to serialize draft")
    }

    /// Write the export to `<dir>/<stem>_set.json` and return the path.
    pub fn save_export(&self, dir: &Path, filter: &Filter) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(filter.export_file_name());
        std::fs::write(&path, self.to_json()?)
            .with_context(|| format!("failed to write draft to {}", path.display()))?;
        info!(path = %path.display(), questions = self.len(), "draft exported");
        Ok(path)
    }

    pub fn from_export(export: ExportedDraft) -> Self {
        Self {
            title: export.title,
            questions: export.list,
        }
    }

    /// Parse an exported draft document.
    pub fn parse_export(json: &str) -> Result<Self> {
        let export: ExportedDraft =
            serde_json::from_str(json).context("failed to parse draft JSON")?;
        Ok(Self::from_export(export))
    }

    pub fn load_export(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read draft from {}", path.display()))?;
        Self::parse_export(&content)
    }

    /// Build the store payload, rejecting a blank name or an empty draft.
    pub fn to_new_set(&self, filter: &Filter, name: &str) -> Result<NewQuestionSet, DraftError> {
        if self.title.trim().is_empty() || name.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        if self.questions.is_empty() {
            return Err(DraftError::EmptyDraft);
        }
        Ok(NewQuestionSet {
            name: name.trim().to_string(),
            grade: filter.grade,
            semester: filter.semester,
            exam_type: filter.exam_type,
            subject: filter.subject,
            questions: self.questions.clone(),
        })
    }

    /// Send the draft to `store` as a new question set.
    ///
    /// Validation runs before any request. The draft is left untouched
    /// whether or not the store accepts it.
    pub async fn submit_draft(
        &self,
        store: &dyn QuestionStore,
        filter: &Filter,
        name: &str,
    ) -> Result<String> {
        let payload = self.to_new_set(filter, name)?;
        let id = store
            .create_question_set(&payload)
            .await
            .with_context(|| format!("failed to submit question set {:?}", payload.name))?;
        info!(id = %id, questions = payload.questions.len(), "draft submitted");
        Ok(id)
    }
}

fn set_kind(q: &mut Question, kind: QuestionType) {
    if q.kind == kind {
        return;
    }
    q.kind = kind;
    match kind {
        QuestionType::Subjective => {
            if matches!(q.answer, AnswerValue::Choice(_)) {
                q.answer = AnswerValue::unset();
            }
        }
        QuestionType::Objective => {
            if q.choices.is_empty() {
                q.choices = vec![String::new(); DEFAULT_CHOICE_COUNT];
            }
            if matches!(q.answer, AnswerValue::Text(_)) {
                q.answer = AnswerValue::Choice(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubStore;

    fn draft_with_choices(answer: usize) -> Draft {
        let mut draft = Draft::with_template_question();
        for (i, text) in ["가", "나", "다", "라"].iter().enumerate() {
            draft.update_choice(0, i, text).unwrap();
        }
        draft
            .update_field(0, DraftField::Answer, &answer.to_string())
            .unwrap();
        draft
    }

    #[test]
    fn add_question_on_empty_draft_uses_template() {
        let mut draft = Draft::new();
        assert_eq!(draft.add_question(), 1);
        let q = &draft.questions()[0];
        assert_eq!(q.choices, vec![""; 4]);
        assert_eq!(q.answer, AnswerValue::Choice(0));
        assert_eq!(q.kind, QuestionType::Objective);
        assert!(q.passage.is_empty() && q.passage_title.is_empty());
    }

    #[test]
    fn remove_question_out_of_range_is_a_no_op() {
        let mut draft = Draft::with_template_question();
        assert!(!draft.remove_question(3));
        assert_eq!(draft.len(), 1);
        assert!(draft.remove_question(0));
        assert!(draft.is_empty());
    }

    #[test]
    fn update_text_fields() {
        let mut draft = Draft::with_template_question();
        draft
            .update_field(0, DraftField::PassageTitle, "소나기")
            .unwrap();
        draft
            .update_field(0, DraftField::Question, "주인공은?")
            .unwrap();
        assert_eq!(draft.questions()[0].passage_title, "소나기");
        assert_eq!(draft.questions()[0].question, "주인공은?");
        assert!(matches!(
            draft.update_field(2, DraftField::Passage, "x"),
            Err(DraftError::QuestionOutOfRange { index: 2, len: 1 })
        ));
    }

    #[test]
    fn answer_is_coerced_to_integer() {
        let mut draft = Draft::with_template_question();
        draft.update_field(0, DraftField::Answer, " 2 ").unwrap();
        assert_eq!(draft.questions()[0].answer, AnswerValue::Choice(2));
        assert!(matches!(
            draft.update_field(0, DraftField::Answer, "two"),
            Err(DraftError::InvalidAnswer(_))
        ));
        assert!(matches!(
            draft.update_field(0, DraftField::Answer, "4"),
            Err(DraftError::ChoiceOutOfRange { .. })
        ));
    }

    #[test]
    fn switching_to_subjective_stores_text_answers() {
        let mut draft = Draft::with_template_question();
        draft
            .update_field(0, DraftField::Type, "subjective")
            .unwrap();
        assert!(draft.questions()[0].answer.is_unset());
        draft.update_field(0, DraftField::Answer, "서울").unwrap();
        assert_eq!(draft.questions()[0].answer, AnswerValue::Text("서울".into()));

        draft.update_field(0, DraftField::Type, "objective").unwrap();
        assert_eq!(draft.questions()[0].answer, AnswerValue::Choice(0));
        assert!(matches!(
            draft.update_field(0, DraftField::Type, "essay"),
            Err(DraftError::InvalidType(_))
        ));
    }

    #[test]
    fn add_and_update_choices() {
        let mut draft = Draft::with_template_question();
        assert_eq!(draft.add_choice(0).unwrap(), 5);
        draft.update_choice(0, 4, "마").unwrap();
        assert_eq!(draft.questions()[0].choices[4], "마");
        assert!(draft.update_choice(0, 9, "x").is_err());
    }

    #[test]
    fn removing_last_choice_is_rejected() {
        let mut draft = Draft::with_template_question();
        for _ in 0..3 {
            draft.remove_choice(0, 0).unwrap();
        }
        assert_eq!(draft.questions()[0].choices.len(), 1);
        assert!(matches!(draft.remove_choice(0, 0), Err(DraftError::LastChoice)));
        assert_eq!(draft.questions()[0].choices.len(), 1);
    }

    #[test]
    fn removing_lower_choice_keeps_answer_on_same_text() {
        let mut draft = draft_with_choices(2);
        draft.remove_choice(0, 0).unwrap();
        let q = &draft.questions()[0];
        assert_eq!(q.answer, AnswerValue::Choice(1));
        assert_eq!(q.correct_answer_text(), "다");
    }

    #[test]
    fn removing_answered_choice_resets_to_zero() {
        let mut draft = draft_with_choices(3);
        draft.remove_choice(0, 3).unwrap();
        assert_eq!(draft.questions()[0].answer, AnswerValue::Choice(0));
    }

    #[test]
    fn removing_higher_choice_leaves_answer() {
        let mut draft = draft_with_choices(1);
        draft.remove_choice(0, 3).unwrap();
        assert_eq!(draft.questions()[0].answer, AnswerValue::Choice(1));
    }

    #[test]
    fn export_roundtrip_preserves_content_and_order() {
        let mut draft = draft_with_choices(1);
        draft.set_title("중3_국어_1학기_중간");
        draft.add_question();
        draft.update_field(1, DraftField::Type, "subjective").unwrap();
        draft.update_field(1, DraftField::Answer, "가을").unwrap();
        draft.update_field(1, DraftField::Image, "data:image/png;base64,AA==").unwrap();

        let json = draft.to_json().unwrap();
        assert!(json.starts_with("{\n  \"title\""));
        let parsed = Draft::parse_export(&json).unwrap();
        assert_eq!(parsed, draft);
        assert_eq!(parsed.questions(), draft.questions());
    }

    #[test]
    fn save_export_uses_filter_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut draft = Draft::with_template_question();
        draft.set_title("t");
        let path = draft.save_export(dir.path(), &Filter::default()).unwrap();
        assert!(path.ends_with("grade3_sem1_mid_korean_set.json"));
        assert_eq!(Draft::load_export(&path).unwrap(), draft);
    }

    #[test]
    fn field_names_parse_loosely() {
        assert_eq!("passageTitle".parse::<DraftField>().unwrap(), DraftField::PassageTitle);
        assert_eq!("passage_title".parse::<DraftField>().unwrap(), DraftField::PassageTitle);
        assert_eq!("TYPE".parse::<DraftField>().unwrap(), DraftField::Type);
        assert!("choices".parse::<DraftField>().is_err());
    }

    #[tokio::test]
    async fn attach_image_sets_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.png");
        std::fs::write(&path, b"hi").unwrap();

        let mut draft = Draft::with_template_question();
        draft.attach_image(0, &path).await.unwrap();
        assert_eq!(draft.questions()[0].image, "data:image/png;base64,aGk=");

        draft.clear_image(0).unwrap();
        assert!(!draft.questions()[0].has_image());
        assert!(draft.attach_image(5, &path).await.is_err());
    }

    #[tokio::test]
    async fn submit_requires_title_before_any_request() {
        let store = StubStore::default();
        let draft = Draft::with_template_question();
        let err = draft
            .submit_draft(&store, &Filter::default(), "중간1")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DraftError>(),
            Some(DraftError::MissingTitle)
        ));
        assert!(store.created().is_empty());
    }

    #[tokio::test]
    async fn submit_sends_filter_metadata() {
        let store = StubStore::default();
        let mut draft = draft_with_choices(1);
        draft.set_title("중간1");
        let id = draft
            .submit_draft(&store, &Filter::default(), "중간1")
            .await
            .unwrap();
        assert_eq!(id, "created-1");

        let created = store.created();
        assert_eq!(created[0].filter(), Filter::default());
        assert_eq!(created[0].questions, draft.questions());
    }

    #[tokio::test]
    async fn failed_submit_keeps_draft() {
        let store = StubStore::failing();
        let mut draft = draft_with_choices(1);
        draft.set_title("중간1");
        let before = draft.clone();
        assert!(draft
            .submit_draft(&store, &Filter::default(), "중간1")
            .await
            .is_err());
        assert_eq!(draft, before);
    }
}
