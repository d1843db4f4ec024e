//! Core data model types for quizdeck.
//!
//! Questions, answer values, the filter dimensions that scope question sets,
//! and the summaries exchanged with a question store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of empty choices a freshly added draft question starts with.
pub const DEFAULT_CHOICE_COUNT: usize = 4;

/// Minimum number of choices an objective question keeps while editing.
pub const MIN_CHOICE_COUNT: usize = 1;

/// A single quiz item.
///
/// Field order matches the exported JSON shape consumed downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Title shown above the passage.
    #[serde(default)]
    pub passage_title: String,
    /// Reading passage the question refers to.
    #[serde(default)]
    pub passage: String,
    /// The question text.
    pub question: String,
    /// Choice strings (objective questions only).
    #[serde(default)]
    pub choices: Vec<String>,
    /// Zero-based choice index or free-text answer.
    pub answer: AnswerValue,
    /// Explanation revealed after submission.
    #[serde(default)]
    pub explanation: String,
    /// Objective or subjective.
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    /// Image as a data URI, empty when absent.
    #[serde(default)]
    pub image: String,
}

impl Question {
    /// The blank objective question used when authoring.
    pub fn template() -> Self {
        Self {
            passage_title: String::new(),
            passage: String::new(),
            question: String::new(),
            choices: vec![String::new(); DEFAULT_CHOICE_COUNT],
            answer: AnswerValue::Choice(0),
            explanation: String::new(),
            kind: QuestionType::Objective,
            image: String::new(),
        }
    }

    pub fn is_objective(&self) -> bool {
        self.kind == QuestionType::Objective
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    /// Human-readable form of `value` for this question.
    ///
    /// Objective answers are rendered as the choice text they point at; an
    /// index outside the choice list falls back to the index itself.
    pub fn render_answer(&self, value: &AnswerValue) -> String {
        match (self.kind, value) {
            (QuestionType::Objective, AnswerValue::Choice(i)) => self
                .choices
                .get(*i)
                .cloned()
                .unwrap_or_else(|| i.to_string()),
            (_, other) => other.to_string(),
        }
    }

    /// The correct answer rendered for display.
    pub fn correct_answer_text(&self) -> String {
        self.render_answer(&self.answer)
    }
}

/// Question type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Objective,
    Subjective,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Objective => write!(f, "objective"),
            QuestionType::Subjective => write!(f, "subjective"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "objective" => Ok(QuestionType::Objective),
            "subjective" => Ok(QuestionType::Subjective),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// An answer: a zero-based choice index or free text.
///
/// Serialized as a bare JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(usize),
    Text(String),
}

impl AnswerValue {
    /// The "not answered yet" sentinel.
    pub fn unset() -> Self {
        AnswerValue::Text(String::new())
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, AnswerValue::Text(t) if t.is_empty())
    }

    /// String form used for scoring comparisons.
    pub fn as_compare_string(&self) -> String {
        self.to_string()
    }
}

impl Default for AnswerValue {
    fn default() -> Self {
        Self::unset()
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Choice(i) => write!(f, "{i}"),
            AnswerValue::Text(t) => f.write_str(t),
        }
    }
}

impl From<usize> for AnswerValue {
    fn from(i: usize) -> Self {
        AnswerValue::Choice(i)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Filter dimensions
// ---------------------------------------------------------------------------

macro_rules! filter_dimension {
    (
        $(#[$meta:meta])*
        $name:ident ($what:literal) {
            $($variant:ident => $code:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $code)] $variant,)+
        }

        impl $name {
            /// Every value, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Code used in ids, file names, and store queries.
            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            /// Korean display label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.code() == lowered)
                    .ok_or_else(|| format!("unknown {}: {}", $what, s.trim()))
            }
        }
    };
}

filter_dimension! {
    /// School grade.
    Grade ("grade") {
        Grade2 => "grade2", "중학교 2학년";
        Grade3 => "grade3", "중학교 3학년";
        Grade10 => "grade10", "고등학교 1학년";
        Grade11 => "grade11", "고등학교 2학년";
        Grade12 => "grade12", "고등학교 3학년";
    }
}

filter_dimension! {
    Semester ("semester") {
        Sem1 => "sem1", "1학기";
        Sem2 => "sem2", "2학기";
    }
}

filter_dimension! {
    /// Midterm or final exam.
    ExamType ("exam type") {
        Mid => "mid", "중간고사";
        Final => "final", "기말고사";
    }
}

filter_dimension! {
    Subject ("subject") {
        Korean => "korean", "국어";
        Math => "math", "수학";
        English => "english", "영어";
        Science => "science", "과학";
        Social => "social", "사회";
    }
}

/// The (grade, semester, examType, subject) tuple scoping visible sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub grade: Grade,
    pub semester: Semester,
    pub exam_type: ExamType,
    pub subject: Subject,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            grade: Grade::Grade3,
            semester: Semester::Sem1,
            exam_type: ExamType::Mid,
            subject: Subject::Korean,
        }
    }
}

impl Filter {
    pub fn new(grade: Grade, semester: Semester, exam_type: ExamType, subject: Subject) -> Self {
        Self {
            grade,
            semester,
            exam_type,
            subject,
        }
    }

    /// `<grade>_<semester>_<examType>_<subject>`, used for folders and files.
    pub fn stem(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.grade, self.semester, self.exam_type, self.subject
        )
    }

    /// Parse a stem such as `grade3_sem1_mid_korean`.
    pub fn parse_stem(stem: &str) -> Result<Self, String> {
        let parts: Vec<&str> = stem.split('_').collect();
        let [grade, semester, exam_type, subject] = parts.as_slice() else {
            return Err(format!("expected <grade>_<semester>_<examType>_<subject>, got {stem}"));
        };
        Ok(Self {
            grade: grade.parse()?,
            semester: semester.parse()?,
            exam_type: exam_type.parse()?,
            subject: subject.parse()?,
        })
    }

    /// File name an exported draft for this filter is saved under.
    pub fn export_file_name(&self) -> String {
        format!("{}_set.json", self.stem())
    }

    /// Korean heading, e.g. "중학교 3학년 1학기 중간고사 국어 시험".
    pub fn heading(&self) -> String {
        format!(
            "{} {} {} {} 시험",
            self.grade.label(),
            self.semester.label(),
            self.exam_type.label(),
            self.subject.label()
        )
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

// ---------------------------------------------------------------------------
// Store payloads
// ---------------------------------------------------------------------------

/// A persisted question set as listed by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSetSummary {
    /// Opaque id assigned by the store.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Payload for creating a question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestionSet {
    pub name: String,
    pub grade: Grade,
    pub semester: Semester,
    pub exam_type: ExamType,
    pub subject: Subject,
    pub questions: Vec<Question>,
}

impl NewQuestionSet {
    pub fn filter(&self) -> Filter {
        Filter::new(self.grade, self.semester, self.exam_type, self.subject)
    }
}
