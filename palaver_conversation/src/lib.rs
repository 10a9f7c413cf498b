#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Multi-turn dialogue with per-user history.
//!
//! A turn appends the user's message to that user's stored history, runs it
//! through a fixed sequence of stages (optionally a web search, then the
//! language model) and stores the result only once every stage succeeded.
//!
//! # Key Features
//! - Injectable session store, one history per user identifier
//! - Direct or retrieval-augmented pipelines
//! - Turns for the same user are serialized
//! - Interactive stdin/stdout loop

mod interactive;
mod manager;
mod pipeline;
mod stage;
#[cfg(test)]
mod test_support;

pub use interactive::is_exit_command;
pub use manager::{DialogueManager, TurnResult};
pub use pipeline::Pipeline;
pub use stage::{
    GenerateStage, GenerationConfig, SEARCH_RESULTS_LABEL, SearchStage, Stage, StageKind,
};
