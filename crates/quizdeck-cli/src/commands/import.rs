//! The `quizdeck import` command.
//!
//! Sets whose name already exists under the same filter are skipped, so
//! importing the same directory twice adds nothing.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result};

use quizdeck_core::loader::load_data_directory;
use quizdeck_core::model::NewQuestionSet;

pub async fn execute(data: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let (_config, store) = super::open_store(config_path.as_deref())?;

    let sets = load_data_directory(&data)?;
    anyhow::ensure!(
        !sets.is_empty(),
        "no question sets found under {}",
        data.display()
    );

    // Existing set names, keyed by filter stem.
    let mut existing: HashMap<String, HashSet<String>> = HashMap::new();
    let mut imported = 0;
    let mut skipped = 0;
    let mut total_questions = 0;

    for set in &sets {
        let stem = set.filter.stem();
        if !existing.contains_key(&stem) {
            let names = store
                .list_question_sets(&set.filter)
                .await
                .with_context(|| format!("failed to list existing sets for {}", set.filter))?
                .into_iter()
                .map(|s| s.name)
                .collect();
            existing.insert(stem.clone(), names);
        }
        let names = existing.entry(stem).or_default();

        if names.contains(&set.name) {
            println!("  {} / {} already exists, skipping.", set.filter, set.name);
            skipped += 1;
            continue;
        }

        let payload = NewQuestionSet {
            name: set.name.clone(),
            grade: set.filter.grade,
            semester: set.filter.semester,
            exam_type: set.filter.exam_type,
            subject: set.filter.subject,
            questions: set.questions.clone(),
        };
        let id = store
            .create_question_set(&payload)
            .await
            .with_context(|| format!("failed to import {}", set.path.display()))?;
        println!(
            "  {} / {} ({} questions) -> {id}",
            set.filter,
            set.name,
            set.questions.len()
        );
        names.insert(set.name.clone());
        imported += 1;
        total_questions += set.questions.len();
    }

    println!("Imported {imported} question set(s), {total_questions} question(s).");
    if skipped > 0 {
        println!("Skipped {skipped} existing question set(s).");
    }
    Ok(())
}
