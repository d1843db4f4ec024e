//! quizdeck-core — Question model, quiz sessions, scoring, and authoring.
//!
//! This crate defines the data model, the store trait, the quiz session
//! state machine, and the draft editor that the rest of quizdeck builds on.

pub mod context;
pub mod draft;
pub mod error;
pub mod image;
pub mod loader;
pub mod messages;
pub mod model;
pub mod report;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;
