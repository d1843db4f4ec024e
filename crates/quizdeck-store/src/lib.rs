//! quizdeck-store — Question store backends.
//!
//! Implements the `QuestionStore` trait over a REST service, a static JSON
//! directory, and an in-memory map, plus the configuration that picks one.

pub mod config;
pub mod fs;
pub mod http;
pub mod memory;

pub use config::{create_store, load_config, load_config_from, QuizdeckConfig, StoreConfig};
pub use fs::FileStore;
pub use http::HttpStore;
pub use memory::InMemoryStore;
pub use quizdeck_core::error::StoreError;
