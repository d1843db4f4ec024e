//! The `quizdeck sets` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdeck_core::context::QuizContext;
use quizdeck_core::messages;

use crate::FilterArgs;

pub async fn execute(filter: FilterArgs, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store) = super::open_store(config_path.as_deref())?;
    let filter = filter.resolve(config.default_filter);

    let mut ctx = QuizContext::new(filter).with_timeout(config.request_timeout());
    let sets = ctx.refresh_sets(store.as_ref()).await;

    println!("{}", filter.heading());
    if sets.is_empty() {
        println!("{}", ctx.sets_error().unwrap_or(messages::NO_SETS_AVAILABLE));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Id"]);
    for (i, set) in sets.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&set.name),
            Cell::new(&set.id),
        ]);
    }
    println!("{table}");

    Ok(())
}
