//! # diff-context - Minimal code context for diff review
//!
//! Given the lines a unified diff adds to a file, finds the smallest
//! enclosing function, method, or class for each of them and produces
//! bounded source snippets a reviewer (human or model) can read without the
//! rest of the file.
//!
//! ## Overview
//!
//! Two parts work together:
//!
//! - **Diff line mapping**: hunk headers and bodies are turned into old/new
//!   line tables and the set of added new-file lines.
//! - **AST context extraction**: the changed file is parsed with tree-sitter,
//!   every function/method/class overlapping an added line becomes a
//!   candidate, and a minimal-coverage pass keeps the tightest units.
//!   Oversized units are cut at a character limit or windowed around the
//!   added lines.
//!
//! JavaScript, JSX, TypeScript and TSX files are analyzed directly. Vue
//! single-file components are split into blocks and each script block is
//! analyzed in its own line numbering.
//!
//! ## Architecture
//!
//! ```text
//!   unified diff ──► DiffLineMap ──► AddedLines
//!                                        │
//!   file path ──► ContextExtractor ◄─────┘
//!                   │ by extension
//!         ┌─────────┴──────────┐
//!   ScriptExtractor     ComponentExtractor
//!         │              (per script block)
//!         ▼                    │
//!   parse ► traverse ► select ► truncate
//!                   │
//!            ExtractionResult (sections + error tags)
//! ```
//!
//! ## Modules
//!
//! - [`diff`]: unified-diff line mapping and the added-line set
//! - [`context`]: parsing, candidate selection, truncation and dispatch
//! - [`types`]: sections and extraction results with JSON schema
//! - [`config`]: analysis limits with TOML and environment overrides
//! - [`error`]: error types, including the per-file error tags
//! - [`paths`]: config locations and source path resolution
//!
//! ## Usage Example
//!
//! ```no_run
//! use diff_context::{Config, ContextExtractor, FileDiff};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let extractor = ContextExtractor::new(Config::new()?)?;
//!
//!     let file = FileDiff {
//!         path: "src/service.js".to_string(),
//!         diff: std::fs::read_to_string("service.diff")?,
//!     };
//!     let result = extractor.extract_diff(&file, Path::new(".")).await;
//!
//!     for tag in &result.errors {
//!         eprintln!("{}: {}", result.file_path, tag);
//!     }
//!     print!("{}", result.render_context());
//!     Ok(())
//! }
//! ```

/// Configuration management with environment variable overrides
pub mod config;

/// AST context extraction for changed lines
pub mod context;

/// Unified-diff line mapping
pub mod diff;

/// Error types and per-file error tags
pub mod error;

/// Config locations and source path resolution
pub mod paths;

/// Extraction result types with JSON schema definitions
pub mod types;

pub use config::Config;
pub use context::ContextExtractor;
pub use diff::{AddedLines, DiffLineMap};
pub use error::{ContextError, DiffError, ExtractError};
pub use types::{ExtractionResult, FileDiff, Section, TruncationReason, UnitKind};
