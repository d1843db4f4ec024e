pub mod author;
pub mod import;
pub mod init;
pub mod sets;
pub mod take;
pub mod upload;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use quizdeck_core::traits::QuestionStore;
use quizdeck_store::{create_store, load_config_from, QuizdeckConfig};

/// Load the config and build the store it names.
pub fn open_store(config_path: Option<&Path>) -> Result<(QuizdeckConfig, Box<dyn QuestionStore>)> {
    let config = load_config_from(config_path)?;
    let store = create_store(&config)?;
    tracing::debug!(store = store.name(), "store ready");
    Ok((config, store))
}
