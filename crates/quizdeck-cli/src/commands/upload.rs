//! The `quizdeck upload` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdeck_core::draft::Draft;

use crate::FilterArgs;

pub async fn execute(
    filter: FilterArgs,
    file: PathBuf,
    name: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = super::open_store(config_path.as_deref())?;
    let filter = filter.resolve(config.default_filter);

    let draft = Draft::load_export(&file)?;
    let name = name.unwrap_or_else(|| draft.title().to_string());

    let id = draft.submit_draft(store.as_ref(), &filter, &name).await?;
    println!(
        "Created question set '{name}' ({} questions) for {}: {id}",
        draft.len(),
        filter.heading()
    );

    Ok(())
}
