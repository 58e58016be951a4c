//! AST context extraction
//!
//! Finds, for a set of added lines, the smallest functions, methods and
//! classes that enclose them, and renders bounded snippets of each.

/// Error-tolerant tree-sitter parsing with diagnostics
pub mod ast_parser;
/// Candidate units and their names
pub mod candidate;
/// Single-file component (`.vue`) extraction
pub mod component;
/// File routing and failure boundary
pub mod dispatch;
/// Extension to grammar mapping
pub mod language;
/// Depth guard, timeouts and file reading
pub mod safety;
/// Plain script extraction
pub mod script;
/// Minimal-coverage selection
pub mod selector;
/// Snippet truncation and windowing
pub mod truncate;

pub use component::ComponentExtractor;
pub use dispatch::ContextExtractor;
pub use language::{FileKind, ScriptLang, detect_file_kind};
pub use script::{NamingContext, ScriptExtractor};
pub use selector::{Selected, select_minimal_coverage};
