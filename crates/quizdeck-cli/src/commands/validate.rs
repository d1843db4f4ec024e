//! The `quizdeck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdeck_core::loader::{load_set_directory, load_set_file, validate_questions};

pub fn execute(path: PathBuf) -> Result<()> {
    let sets = if path.is_dir() {
        load_set_directory(&path)?
    } else {
        vec![(path.clone(), load_set_file(&path)?)]
    };

    let mut total_warnings = 0;

    for (file, raw) in sets {
        let label = raw
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| file.display().to_string());
        let questions = raw.into_ordered_questions();
        println!("Question set: {label} ({} questions)", questions.len());

        if questions.is_empty() {
            println!("  WARNING: set has no questions");
            total_warnings += 1;
        }

        let warnings = validate_questions(&questions);
        for w in &warnings {
            println!("  [Q{}] WARNING: {}", w.index + 1, w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
