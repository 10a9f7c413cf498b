#![deny(
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

mod credentials;
mod schema;

pub use credentials::{BRAVE_SEARCH_API_KEY_VAR, Credentials, OPENAI_API_KEY_VAR};
pub use schema::{Config, ModelConfig, SearchConfig};
