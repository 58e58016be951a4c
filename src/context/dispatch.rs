//! Per-file routing and the failure boundary of context extraction
//!
//! [`ContextExtractor::extract_many`] runs up to `runtime.concurrency` files
//! at once, and each parse runs on tokio's blocking pool, so parses of
//! different files execute in parallel rather than one after another. As with
//! the per-file timeout, a timed-out parse keeps its blocking thread until it
//! finishes.

use super::component::ComponentExtractor;
use super::language::{FileKind, detect_file_kind};
use super::safety::{SourceText, read_source};
use super::script::ScriptExtractor;
use crate::config::Config;
use crate::diff::AddedLines;
use crate::error::{ContextError, ExtractError};
use crate::paths::{extension_of, resolve_source_path};
use crate::types::{ExtractionResult, FileDiff};
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Entry point for diff context extraction.
///
/// Every method returns a well-formed [`ExtractionResult`]; failures end up
/// as tags on the result instead of errors.
///
/// # Example
///
/// ```no_run
/// use diff_context::{AddedLines, Config, ContextExtractor};
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let extractor = ContextExtractor::new(Config::default())?;
///     let added: AddedLines = [11, 12].into_iter().collect();
///
///     let result = extractor
///         .extract_file("src/service.js", &added, Path::new("."))
///         .await;
///     println!("{}", result.render_context());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ContextExtractor {
    config: Arc<Config>,
}

impl ContextExtractor {
    /// Create an extractor. An invalid configuration is rejected here rather
    /// than per file.
    pub fn new(config: Config) -> Result<Self, ContextError> {
        Self::with_shared_config(Arc::new(config))
    }

    pub fn with_shared_config(config: Arc<Config>) -> Result<Self, ContextError> {
        config.validate()?;
        tracing::debug!(
            "Context extractor limits: {} chars, {} lines, depth {}, {}ms",
            config.analysis.max_snippet_chars,
            config.analysis.max_block_lines,
            config.analysis.max_depth,
            config.analysis.timeout_ms
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract the minimal enclosing units of `added` from one file.
    ///
    /// `file_path` picks the extractor by extension and is resolved against
    /// `root` when relative. Panics anywhere below become `unexpected_error`.
    pub async fn extract_file(&self, file_path: &str, added: &AddedLines, root: &Path) -> ExtractionResult {
        guarded(file_path, self.route(file_path, added, root)).await
    }

    /// Build the added-line set from a file's diff text, then extract
    pub async fn extract_diff(&self, file: &FileDiff, root: &Path) -> ExtractionResult {
        let added = AddedLines::from_diff(&file.diff);
        self.extract_file(&file.path, &added, root).await
    }

    /// Extract several files with bounded concurrency, keyed by path.
    ///
    /// Completion order does not matter; a failing file only affects its own
    /// entry.
    pub async fn extract_many(&self, files: Vec<FileDiff>, root: &Path) -> BTreeMap<String, ExtractionResult> {
        let concurrency = self.config.runtime.concurrency.max(1);
        tracing::info!(
            "Extracting context for {} file(s), {} at a time",
            files.len(),
            concurrency
        );

        stream::iter(files)
            .map(|file| async move {
                let result = self.extract_diff(&file, root).await;
                (file.path, result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }

    async fn route(&self, file_path: &str, added: &AddedLines, root: &Path) -> ExtractionResult {
        let kind = detect_file_kind(file_path);
        if kind == FileKind::Unsupported {
            let extension = extension_of(file_path).unwrap_or_default();
            tracing::debug!("Skipping {}: unsupported file type", file_path);
            return ExtractionResult::failed(file_path, ExtractError::UnsupportedFileType(extension));
        }

        let mut result = ExtractionResult::empty(file_path);
        if added.is_empty() {
            return result;
        }

        let path = resolve_source_path(root, file_path);
        let source = match read_source(&path).await {
            SourceText::Readable(text) => text,
            SourceText::Unreadable { reason } => {
                result.record(ExtractError::FileNotReadable {
                    path: path.display().to_string(),
                    reason,
                });
                return result;
            }
        };

        let analysis = &self.config.analysis;
        match kind {
            FileKind::Script(lang) => {
                let outcome = ScriptExtractor::new(analysis, lang).extract(&source, added).await;
                result.sections = outcome.sections;
                outcome.issues.into_iter().for_each(|issue| result.record(issue));
                result.sort_sections();
            }
            FileKind::Component => {
                let outcome = ComponentExtractor::new(analysis).extract(&source, added).await;
                result.sections = outcome.sections;
                result.component = outcome.metadata;
                outcome.issues.into_iter().for_each(|issue| result.record(issue));
            }
            FileKind::Unsupported => {}
        }

        result
    }
}

/// Run one file's extraction, turning a panic into `unexpected_error` and
/// stamping the elapsed time
async fn guarded<F>(file_path: &str, work: F) -> ExtractionResult
where
    F: Future<Output = ExtractionResult>,
{
    let start = Instant::now();

    let mut result = match AssertUnwindSafe(work).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!("Context extraction panicked for {}: {}", file_path, message);
            ExtractionResult::failed(file_path, ExtractError::Unexpected(message))
        }
    };

    result.duration_ms = start.elapsed().as_millis() as u64;
    tracing::debug!(
        "{}: {} section(s), {} error(s), {} warning(s) in {}ms",
        file_path,
        result.sections.len(),
        result.errors.len(),
        result.warnings.len(),
        result.duration_ms
    );
    result
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
