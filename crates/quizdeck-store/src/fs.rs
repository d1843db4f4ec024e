//! Static JSON directory store.
//!
//! Layout under `root`:
//!
//! ```text
//! <stem>/index.json        [{"name": "...", "file": "set1.json"}, ...]
//! <stem>/set1.json         {title, list} or {<category>: [...]}
//! <stem>.json              a single set for the whole filter
//! ```
//!
//! Set ids are paths relative to `root`: `<stem>/<file>` or `<stem>.json`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use quizdeck_core::draft::ExportedDraft;
use quizdeck_core::error::StoreError;
use quizdeck_core::loader::{parse_index, parse_raw_set, IndexEntry, INDEX_FILE};
use quizdeck_core::model::{Filter, NewQuestionSet, Question, QuestionSetSummary};
use quizdeck_core::selection::{selection_rng, SelectionPolicy, ShuffleWithinCategories};
use quizdeck_core::traits::QuestionStore;

pub struct FileStore {
    root: PathBuf,
    policy: Box<dyn SelectionPolicy>,
    seed: Option<u64>,
    /// Serializes `index.json` rewrites.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// A store over `root` that shuffles categorized sets.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: Box::new(ShuffleWithinCategories),
            seed: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: Box<dyn SelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Fix the shuffle seed so every load yields the same order.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a set id to a file under `root`, rejecting anything that
    /// could escape it.
    fn resolve(&self, set_id: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(set_id);
        let safe = !set_id.is_empty()
            && !set_id.contains('\\')
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StoreError::InvalidData(format!("invalid set id: {set_id:?}")));
        }
        Ok(self.root.join(relative))
    }

    async fn read_optional(&self, path: &Path) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        tokio::fs::write(path, content).await.map_err(|e| {
            StoreError::Storage(format!("failed to write {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl QuestionStore for FileStore {
    fn name(&self) -> &str {
        "files"
    }

    async fn list_question_sets(&self, filter: &Filter) -> anyhow::Result<Vec<QuestionSetSummary>> {
        let stem = filter.stem();
        let mut sets = Vec::new();

        let index_path = self.root.join(&stem).join(INDEX_FILE);
        if let Some(content) = self.read_optional(&index_path).await? {
            let entries = parse_index(&content).map_err(|e| {
                StoreError::InvalidData(format!("{}: {e:#}", index_path.display()))
            })?;
            sets.extend(entries.into_iter().map(|entry| QuestionSetSummary {
                id: format!("{stem}/{}", entry.file),
                name: entry.name,
            }));
        }

        let flat_id = format!("{stem}.json");
        let flat_path = self.root.join(&flat_id);
        if let Some(content) = self.read_optional(&flat_path).await? {
            match parse_raw_set(&content) {
                Ok(raw) => sets.push(QuestionSetSummary {
                    name: raw.title().unwrap_or(&stem).to_string(),
                    id: flat_id,
                }),
                Err(e) => warn!("skipping {}: {e:#}", flat_path.display()),
            }
        }

        debug!(filter = %filter, count = sets.len(), "listed sets from files");
        Ok(sets)
    }

    async fn get_questions(&self, set_id: &str) -> anyhow::Result<Vec<Question>> {
        let path = self.resolve(set_id)?;
        let content = self
            .read_optional(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound(set_id.to_string()))?;
        let raw = parse_raw_set(&content)
            .map_err(|e| StoreError::InvalidData(format!("{}: {e:#}", path.display())))?;

        let mut rng = selection_rng(self.seed);
        let questions = raw.into_questions(self.policy.as_ref(), &mut rng);
        debug!(set = set_id, policy = self.policy.name(), count = questions.len(), "loaded set file");
        Ok(questions)
    }

    async fn create_question_set(&self, set: &NewQuestionSet) -> anyhow::Result<String> {
        let stem = set.filter().stem();
        let folder = self.root.join(&stem);
        let file = format!("{}.json", Uuid::new_v4());

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&folder).await.map_err(|e| {
            StoreError::Storage(format!("failed to create {}: {e}", folder.display()))
        })?;

        let document = ExportedDraft {
            title: set.name.clone(),
            list: set.questions.clone(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.write(&folder.join(&file), &json).await?;

        let index_path = folder.join(INDEX_FILE);
        let mut entries = match self.read_optional(&index_path).await? {
            Some(content) => parse_index(&content).map_err(|e| {
                StoreError::InvalidData(format!("{}: {e:#}", index_path.display()))
            })?,
            None => Vec::new(),
        };
        entries.push(IndexEntry {
            name: set.name.clone(),
            file: file.clone(),
        });
        let index = serde_json::to_string_pretty(&entries)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.write(&index_path, &index).await?;

        let id = format!("{stem}/{file}");
        info!(id = %id, questions = set.questions.len(), "wrote question set");
        Ok(id)
    }
}
