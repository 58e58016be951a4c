//! Context extraction for one self-contained script text

use super::ast_parser::{AstParser, ParsedSource};
use super::candidate::{Candidate, classify, resolve_name};
use super::component::options::probe_component_option;
use super::language::ScriptLang;
use super::safety::{DepthGuard, run_blocking};
use super::selector::{Selected, select_minimal_coverage};
use super::truncate::SnippetPolicy;
use crate::config::AnalysisConfig;
use crate::diff::AddedLines;
use crate::error::ExtractError;
use crate::types::Section;
use tree_sitter::Node;

/// How candidates are tagged with surrounding naming context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingContext {
    #[default]
    Plain,
    /// Tag units with the enclosing option of the default-exported
    /// component options object
    ComponentOptions,
}

/// Sections plus every error and warning met on the way
#[derive(Debug, Default)]
pub struct ScriptOutcome {
    pub sections: Vec<Section>,
    pub issues: Vec<ExtractError>,
}

/// Extracts minimal enclosing units for the added lines of one script text.
///
/// Line numbers in the returned sections are relative to the text. Windowed
/// snippets are labelled with file lines via [`ScriptExtractor::with_first_line`].
pub struct ScriptExtractor<'a> {
    config: &'a AnalysisConfig,
    lang: ScriptLang,
    naming: NamingContext,
    first_line: usize,
}

impl<'a> ScriptExtractor<'a> {
    pub fn new(config: &'a AnalysisConfig, lang: ScriptLang) -> Self {
        Self {
            config,
            lang,
            naming: NamingContext::Plain,
            first_line: 1,
        }
    }

    pub fn with_naming(mut self, naming: NamingContext) -> Self {
        self.naming = naming;
        self
    }

    /// File line on which the text's line 1 sits
    pub fn with_first_line(mut self, first_line: usize) -> Self {
        self.first_line = first_line.max(1);
        self
    }

    /// Parse, traverse, select and truncate.
    ///
    /// Never fails: parse errors and timeouts come back as issues with no
    /// sections.
    pub async fn extract(&self, source: &str, added: &AddedLines) -> ScriptOutcome {
        let mut outcome = ScriptOutcome::default();
        if added.is_empty() {
            return outcome;
        }

        let lang = self.lang;
        let naming = self.naming;
        let max_depth = self.config.max_depth;
        let policy = SnippetPolicy::new(self.config).with_first_line(self.first_line);
        let text = source.to_string();
        let lines = added.clone();

        let analyzed = run_blocking(self.config.timeout(), "parse", move || {
            analyze(lang, naming, max_depth, policy, &text, &lines)
        })
        .await;

        match analyzed {
            Ok(Ok(analysis)) => {
                outcome.sections = analysis.sections;
                outcome.issues = analysis.issues;
            }
            Ok(Err(e)) | Err(e) => {
                tracing::warn!("{} extraction failed: {}", lang.name(), e);
                outcome.issues.push(e);
            }
        }

        outcome
    }
}

struct Analysis {
    sections: Vec<Section>,
    issues: Vec<ExtractError>,
}

/// Synchronous part of extraction, run on the blocking pool
fn analyze(
    lang: ScriptLang,
    naming: NamingContext,
    max_depth: usize,
    policy: SnippetPolicy,
    source: &str,
    added: &AddedLines,
) -> Result<Analysis, ExtractError> {
    let mut parser = AstParser::new(lang)?;
    let parsed = parser.parse(source)?;
    let mut issues = Vec::new();

    if !parsed.is_clean() {
        if let Some(first) = parsed.diagnostics.first() {
            tracing::warn!(
                "{} source has {} syntax error(s), first at {}:{}; continuing with partial tree",
                lang.name(),
                parsed.error_count,
                first.line,
                first.column
            );
        }
        issues.push(ExtractError::SyntaxRecovered(parsed.error_count));
    }

    let traversal = collect_candidates(&parsed, source, added, naming, max_depth)?;
    if let Some(stopped) = traversal.stopped {
        tracing::warn!(
            "Traversal stopped early, keeping {} candidate(s): {}",
            traversal.candidates.len(),
            stopped
        );
        issues.push(stopped);
    }

    let found = traversal.candidates.len();
    let selected = select_minimal_coverage(traversal.candidates, added);
    tracing::debug!(
        "Selected {} of {} {} candidate(s)",
        selected.len(),
        found,
        lang.name()
    );

    let sections = selected
        .into_iter()
        .map(|s| to_section(s, source, &policy))
        .collect();

    Ok(Analysis { sections, issues })
}

struct Traversal {
    candidates: Vec<Candidate>,
    /// Set when the depth guard cut the walk short
    stopped: Option<ExtractError>,
}

/// Pre-order walk over the subtrees that overlap an added line.
///
/// A depth overrun ends the walk but keeps what was collected; any other
/// error discards everything.
fn collect_candidates(
    parsed: &ParsedSource,
    source: &str,
    added: &AddedLines,
    naming: NamingContext,
    max_depth: usize,
) -> Result<Traversal, ExtractError> {
    let mut candidates = Vec::new();
    let mut guard = DepthGuard::new(max_depth);
    let mut cursor = parsed.tree.walk();

    loop {
        let node = cursor.node();
        let (start_line, end_line) = line_range(node);
        let overlaps = added.intersects(start_line, end_line);

        if overlaps && let Some(candidate) = build_candidate(node, source, added, naming)? {
            candidates.push(candidate);
        }

        if overlaps && cursor.goto_first_child() {
            if let Err(e) = guard.enter() {
                return Ok(Traversal {
                    candidates,
                    stopped: Some(e),
                });
            }
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Ok(Traversal {
                    candidates,
                    stopped: None,
                });
            }
            guard.exit();
        }
    }
}

fn line_range(node: Node) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

fn build_candidate(
    node: Node,
    source: &str,
    added: &AddedLines,
    naming: NamingContext,
) -> Result<Option<Candidate>, ExtractError> {
    let Some(kind) = classify(node) else {
        return Ok(None);
    };
    // Zero-width nodes come from error recovery and have no usable span
    if node.is_missing() || node.start_byte() >= node.end_byte() {
        return Ok(None);
    }
    if source.get(node.start_byte()..node.end_byte()).is_none() {
        return Err(ExtractError::Traverse(format!(
            "{} at line {} has a span outside the source",
            node.kind(),
            node.start_position().row + 1
        )));
    }

    let (start_line, end_line) = line_range(node);
    let component_option = match naming {
        NamingContext::Plain => None,
        NamingContext::ComponentOptions => match probe_component_option(node, source) {
            Ok(option) => option,
            Err(e) => {
                tracing::warn!("Ignoring component option lookup failure at line {}: {}", start_line, e);
                None
            }
        },
    };

    Ok(Some(Candidate {
        kind,
        name: resolve_name(node, source)?,
        start_line,
        end_line,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        added_lines: added.within(start_line, end_line),
        component_option,
    }))
}

fn to_section(selected: Selected, source: &str, policy: &SnippetPolicy) -> Section {
    let Selected {
        candidate,
        accounts_for,
    } = selected;

    let raw = source
        .get(candidate.start_byte..candidate.end_byte)
        .unwrap_or_default();
    let line_start = source
        .get(..candidate.start_byte)
        .and_then(|before| before.rfind('\n'))
        .map_or(0, |i| i + 1);
    let lead = source
        .get(line_start..candidate.start_byte)
        .unwrap_or_default();
    let snippet = policy.apply_with_lead(
        lead,
        raw,
        candidate.start_line,
        candidate.end_line,
        &accounts_for,
    );

    Section {
        kind: candidate.kind,
        name: candidate.name,
        start_line: candidate.start_line,
        end_line: candidate.end_line,
        added_lines: accounts_for,
        snippet: snippet.text,
        truncated: snippet.truncated,
        truncation_reason: snippet.reason,
        summary: snippet.summary,
        component_option: candidate.component_option,
    }
}

#[cfg(test)]
mod tests;
