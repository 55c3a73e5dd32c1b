// Public fallible APIs in this crate share one concrete error contract (`GlossaError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod forest;
pub mod fs;
pub mod jsonl;
pub mod parse;
pub mod registry;
pub mod scope;
pub mod scope_tree;
pub mod search;

pub use compose::DefinitionDraft;
pub use config::EngineConfig;
pub use engine::{EngineStatus, GlossaEngine};
pub use error::{GlossaError, Result};
pub use forest::{DefinitionForest, fold_key};
pub use parse::{Definition, DefinitionSource, LineRange, parse_document, strip_front_matter};
pub use registry::GlossaryRegistry;
pub use scope::ScopePath;
pub use scope_tree::ScopeTree;
pub use search::{PhraseMatch, Searcher, phrase_at, resolve_overlaps};
