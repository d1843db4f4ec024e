//! JSON question set loader.
//!
//! Set files come in two shapes: `{title, list: [Question]}` and
//! `{<category>: [Question], ...}`. Both are normalized into one
//! `Vec<Question>` through a [`SelectionPolicy`]. A folder named after a
//! filter stem carries an `index.json` listing `{name, file}` entries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{AnswerValue, Filter, Question, QuestionType};
use crate::selection::{Category, KeepOrder, SelectionPolicy};

/// File name of the per-folder set listing.
pub const INDEX_FILE: &str = "index.json";

/// A question set file as it appears on disk or on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RawQuestionSet {
    /// `{title, list}`, or a bare array (no title).
    Flat {
        title: Option<String>,
        list: Vec<Question>,
    },
    /// `{<category>: [Question]}` in document order.
    Categorized(Vec<Category>),
}

#[derive(Deserialize)]
struct FlatSetFile {
    #[serde(default)]
    title: Option<String>,
    list: Vec<Question>,
}

impl RawQuestionSet {
    pub fn title(&self) -> Option<&str> {
        match self {
            RawQuestionSet::Flat { title, .. } => title.as_deref(),
            RawQuestionSet::Categorized(_) => None,
        }
    }

    pub fn question_count(&self) -> usize {
        match self {
            RawQuestionSet::Flat { list, .. } => list.len(),
            RawQuestionSet::Categorized(categories) => {
                categories.iter().map(|c| c.questions.len()).sum()
            }
        }
    }

    /// Normalize into the canonical question list.
    ///
    /// Flat lists keep their order; categorized sets go through `policy`.
    pub fn into_questions(self, policy: &dyn SelectionPolicy, rng: &mut dyn RngCore) -> Vec<Question> {
        match self {
            RawQuestionSet::Flat { list, .. } => list,
            RawQuestionSet::Categorized(categories) => policy.select(categories, rng),
        }
    }

    /// Normalize without any reordering.
    pub fn into_ordered_questions(self) -> Vec<Question> {
        self.into_questions(&KeepOrder, &mut rand::rngs::mock::StepRng::new(0, 0))
    }
}

/// Parse a set file in either shape.
pub fn parse_raw_set(content: &str) -> Result<RawQuestionSet> {
    let value: Value = serde_json::from_str(content).context("invalid JSON")?;

    match value {
        Value::Array(_) => {
            let list: Vec<Question> =
                serde_json::from_value(value).context("invalid question list")?;
            Ok(RawQuestionSet::Flat { title: None, list })
        }
        Value::Object(map) if is_flat_set(&map) => {
            let flat: FlatSetFile = serde_json::from_value(Value::Object(map))
                .context("invalid {title, list} question set")?;
            Ok(RawQuestionSet::Flat {
                title: flat.title,
                list: flat.list,
            })
        }
        Value::Object(map) => {
            let categories = map
                .into_iter()
                .map(|(name, questions)| {
                    let questions: Vec<Question> = serde_json::from_value(questions)
                        .with_context(|| format!("invalid questions in category {name:?}"))?;
                    Ok(Category { name, questions })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(RawQuestionSet::Categorized(categories))
        }
        _ => anyhow::bail!("a question set must be a JSON object or array"),
    }
}

/// `{title, list}` and nothing else. Any other key makes the object a
/// category map, even when one category happens to be named `list`.
fn is_flat_set(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("list") && map.keys().all(|k| k == "list" || k == "title")
}

/// Read and parse a single set file.
pub fn load_set_file(path: &Path) -> Result<RawQuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set: {}", path.display()))?;
    parse_raw_set(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// One line of an `index.json` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Display name of the set.
    pub name: String,
    /// Sibling file holding the questions.
    pub file: String,
}

/// Parse an `index.json` listing.
pub fn parse_index(content: &str) -> Result<Vec<IndexEntry>> {
    serde_json::from_str(content).context("invalid index.json")
}

/// Read an `index.json` listing.
pub fn load_index(path: &Path) -> Result<Vec<IndexEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read index: {}", path.display()))?;
    parse_index(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// A set found while walking a data directory.
#[derive(Debug, Clone)]
pub struct DataSet {
    pub filter: Filter,
    pub name: String,
    pub path: PathBuf,
    pub questions: Vec<Question>,
}

/// Load every set listed under `<root>/<stem>/index.json`.
///
/// Folders whose name is not a filter stem, or that have no index, are
/// skipped with a warning. A listed file that fails to parse is an error.
pub fn load_data_directory(root: &Path) -> Result<Vec<DataSet>> {
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }

    let mut folders: Vec<PathBuf> = std::fs::read_dir(root)
        .with_context(|| format!("failed to read directory: {}", root.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    folders.sort();

    let mut sets = Vec::new();
    for folder in folders {
        let stem = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filter = match Filter::parse_stem(&stem) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("skipping {}: {}", folder.display(), e);
                continue;
            }
        };
        let index_path = folder.join(INDEX_FILE);
        if !index_path.exists() {
            tracing::warn!("skipping {}: no {INDEX_FILE}", folder.display());
            continue;
        }

        for entry in load_index(&index_path)? {
            let path = folder.join(&entry.file);
            let raw = load_set_file(&path)?;
            sets.push(DataSet {
                filter,
                name: entry.name,
                path,
                questions: raw.into_ordered_questions(),
            });
        }
    }

    Ok(sets)
}

/// Recursively collect every set file (any `.json` other than `index.json`).
pub fn load_set_directory(dir: &Path) -> Result<Vec<(PathBuf, RawQuestionSet)>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            sets.extend(load_set_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json")
            && path.file_name().is_some_and(|n| n != INDEX_FILE)
        {
            match load_set_file(&path) {
                Ok(set) => sets.push((path, set)),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from question validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based question index.
    pub index: usize,
    /// Warning message.
    pub message: String,
}

/// Check a question list for broken objective/subjective invariants.
pub fn validate_questions(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |index: usize, message: String| {
        warnings.push(ValidationWarning { index, message });
    };

    for (i, q) in questions.iter().enumerate() {
        if q.question.trim().is_empty() {
            warn(i, "question text is empty".into());
        }

        match q.kind {
            QuestionType::Objective => {
                if q.choices.is_empty() {
                    warn(i, "objective question has no choices".into());
                }
                if q.choices.iter().any(|c| c.trim().is_empty()) {
                    warn(i, "objective question has an empty choice".into());
                }
                match &q.answer {
                    AnswerValue::Choice(idx) if *idx >= q.choices.len() => warn(
                        i,
                        format!(
                            "answer index {idx} out of range ({} choices)",
                            q.choices.len()
                        ),
                    ),
                    AnswerValue::Choice(_) => {}
                    AnswerValue::Text(t) => match t.trim().parse::<usize>() {
                        Ok(idx) if idx < q.choices.len() => {}
                        Ok(idx) => warn(i, format!("answer index {idx} out of range")),
                        Err(_) => warn(
                            i,
                            format!("objective answer {t:?} is not a choice index"),
                        ),
                    },
                }
            }
            QuestionType::Subjective => {
                if q.answer.to_string().trim().is_empty() {
                    warn(i, "subjective question has a blank answer".into());
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ShuffleWithinCategories;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FLAT_SET: &str = r#"{
  "title": "중3 국어 1학기 중간",
  "list": [
    {"passageTitle": "", "passage": "", "question": "다음 중 명사는?",
     "choices": ["달리다", "하늘", "예쁘다", "빨리"], "answer": 1,
     "explanation": "하늘은 명사입니다.", "type": "objective"},
    {"question": "'봄'의 반대 계절은?", "answer": "가을", "type": "subjective"}
  ]
}"#;

    const CATEGORIZED_SET: &str = r#"{
  "grammar": [
    {"question": "g1", "choices": ["a", "b"], "answer": 0},
    {"question": "g2", "choices": ["a", "b"], "answer": 1}
  ],
  "literature": [
    {"question": "l1", "choices": ["a", "b"], "answer": 0}
  ]
}"#;

    #[test]
    fn parse_flat_set() {
        let raw = parse_raw_set(FLAT_SET).unwrap();
        assert_eq!(raw.title(), Some("중3 국어 1학기 중간"));
        assert_eq!(raw.question_count(), 2);
        let questions = raw.into_ordered_questions();
        assert_eq!(questions[0].answer, AnswerValue::Choice(1));
        assert_eq!(questions[1].kind, QuestionType::Subjective);
    }

    #[test]
    fn parse_categorized_set_keeps_category_order() {
        let raw = parse_raw_set(CATEGORIZED_SET).unwrap();
        let RawQuestionSet::Categorized(categories) = &raw else {
            panic!("expected categorized set");
        };
        assert_eq!(categories[0].name, "grammar");
        assert_eq!(categories[1].name, "literature");

        let mut rng = StdRng::seed_from_u64(3);
        let questions = raw.into_questions(&ShuffleWithinCategories, &mut rng);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[2].question, "l1");
    }

    #[test]
    fn category_named_list_keeps_other_categories() {
        let raw = parse_raw_set(
            r#"{
  "list": [{"question": "l1", "choices": ["a"], "answer": 0}],
  "grammar": [{"question": "g1", "choices": ["a"], "answer": 0}]
}"#,
        )
        .unwrap();
        assert!(matches!(raw, RawQuestionSet::Categorized(_)));
        assert_eq!(raw.question_count(), 2);
        let questions = raw.into_ordered_questions();
        assert_eq!(questions[0].question, "l1");
        assert_eq!(questions[1].question, "g1");
    }

    #[test]
    fn parse_bare_array() {
        let raw = parse_raw_set(r#"[{"question": "q", "choices": ["x"], "answer": 0}]"#).unwrap();
        assert_eq!(raw.title(), None);
        assert_eq!(raw.question_count(), 1);
    }

    #[test]
    fn parse_rejects_scalars_and_bad_questions() {
        assert!(parse_raw_set("42").is_err());
        assert!(parse_raw_set("not json").is_err());
        assert!(parse_raw_set(r#"{"list": [{"choices": []}]}"#).is_err());
    }

    #[test]
    fn validate_flags_broken_invariants() {
        let questions = vec![
            Question {
                question: "q1".into(),
                choices: vec![],
                ..Question::template()
            },
            Question {
                question: "q2".into(),
                choices: vec!["a".into(), "b".into()],
                answer: AnswerValue::Choice(5),
                ..Question::template()
            },
            Question {
                question: "q3".into(),
                choices: vec!["a".into()],
                answer: AnswerValue::Text("first".into()),
                ..Question::template()
            },
            Question {
                question: "  ".into(),
                choices: vec![],
                answer: AnswerValue::unset(),
                kind: QuestionType::Subjective,
                ..Question::template()
            },
        ];
        let warnings = validate_questions(&questions);
        assert!(warnings.iter().any(|w| w.index == 0 && w.message.contains("no choices")));
        assert!(warnings.iter().any(|w| w.index == 1 && w.message.contains("out of range")));
        assert!(warnings.iter().any(|w| w.index == 2 && w.message.contains("not a choice index")));
        assert!(warnings.iter().any(|w| w.index == 3 && w.message.contains("blank answer")));
        assert!(warnings.iter().any(|w| w.index == 3 && w.message.contains("empty")));
    }

    #[test]
    fn validate_accepts_clean_set() {
        let questions = parse_raw_set(FLAT_SET).unwrap().into_ordered_questions();
        assert!(validate_questions(&questions).is_empty());
    }

    #[test]
    fn load_data_directory_reads_index_folders() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("grade3_sem1_mid_korean");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(
            folder.join(INDEX_FILE),
            r#"[{"name": "중간1", "file": "set1.json"}]"#,
        )
        .unwrap();
        std::fs::write(folder.join("set1.json"), FLAT_SET).unwrap();
        std::fs::create_dir_all(dir.path().join("not_a_filter")).unwrap();

        let sets = load_data_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "중간1");
        assert_eq!(sets[0].filter, Filter::default());
        assert_eq!(sets[0].questions.len(), 2);
    }

    #[test]
    fn load_set_directory_skips_index_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), FLAT_SET).unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), "[]").unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let sets = load_set_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].0.ends_with("a.json"));
    }
}
