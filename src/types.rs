use crate::error::ExtractError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Syntactic kind of a unit that can enclose a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// `function name() {}` (including generators)
    FunctionDeclaration,
    /// `function () {}` used as a value
    FunctionExpression,
    /// `() => {}`
    ArrowFunction,
    /// Method inside a class body
    ClassMethod,
    /// Method shorthand inside an object literal
    ObjectMethod,
    /// `class Name {}` or a class expression
    ClassDeclaration,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::FunctionDeclaration => "function_declaration",
            UnitKind::FunctionExpression => "function_expression",
            UnitKind::ArrowFunction => "arrow_function",
            UnitKind::ClassMethod => "class_method",
            UnitKind::ObjectMethod => "object_method",
            UnitKind::ClassDeclaration => "class_declaration",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a snippet was shortened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    #[default]
    None,
    /// Hard cut at the configured character limit
    CharLimit,
    /// Replaced by windows around the added lines
    LineLimit,
}

/// One selected unit of code context for a changed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    /// Syntactic kind of the unit
    pub kind: UnitKind,
    /// Resolved name, or `<anonymous>`
    pub name: String,
    /// First line of the unit (1-based, file coordinates)
    pub start_line: usize,
    /// Last line of the unit (inclusive)
    pub end_line: usize,
    /// Added lines this section accounts for
    pub added_lines: Vec<usize>,
    /// Source text of the unit, possibly truncated or windowed
    pub snippet: String,
    /// Whether `snippet` differs from the raw unit text
    pub truncated: bool,
    /// How the snippet was shortened
    pub truncation_reason: TruncationReason,
    /// Human-readable note present for windowed snippets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Component option (`methods`, `computed`, ...) the unit was declared in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_option: Option<String>,
}

impl Section {
    /// Number of lines the unit spans
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Copy of this section moved from region-local to file coordinates
    pub fn shifted(&self, offset: usize) -> Section {
        use crate::diff::added_lines::local_to_global;

        Section {
            start_line: local_to_global(self.start_line, offset),
            end_line: local_to_global(self.end_line, offset),
            added_lines: self
                .added_lines
                .iter()
                .map(|l| local_to_global(*l, offset))
                .collect(),
            ..self.clone()
        }
    }
}

/// Presence flags and counts for a component file's regions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentMetadata {
    pub has_template: bool,
    pub has_script: bool,
    pub has_script_setup: bool,
    /// Number of `<style>` blocks
    pub style_count: usize,
    /// Number of non-standard top-level blocks (`<i18n>`, `<docs>`, ...)
    pub custom_block_count: usize,
}

/// Everything extracted for one file.
///
/// Errors and sections can coexist: a failure in one region or a stopped
/// traversal still returns whatever was collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResult {
    /// Path as given by the diff
    pub file_path: String,
    /// Selected sections ordered by ascending start line
    pub sections: Vec<Section>,
    /// Error tags (`parse_error: ...`, `file_not_readable`, ...)
    #[serde(default)]
    pub errors: Vec<String>,
    /// Warning tags (`depth_exceeded: ...`, `syntax_recovered: ...`)
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Wall-clock time spent on this file
    pub duration_ms: u64,
    /// Region summary, present for component files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentMetadata>,
}

impl ExtractionResult {
    pub fn empty(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Empty result carrying a single tag
    pub fn failed(file_path: impl Into<String>, error: ExtractError) -> Self {
        let mut result = Self::empty(file_path);
        result.record(error);
        result
    }

    /// File the tag under errors or warnings
    pub fn record(&mut self, error: ExtractError) {
        if error.is_warning() {
            self.warnings.push(error.tag());
        } else {
            self.errors.push(error.tag());
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn sort_sections(&mut self) {
        self.sections
            .sort_by(|a, b| a.start_line.cmp(&b.start_line).then(a.end_line.cmp(&b.end_line)));
    }

    /// Plain-text context block for prompt construction.
    ///
    /// A result without sections renders to an empty string.
    pub fn render_context(&self) -> String {
        let mut out = String::new();

        for section in &self.sections {
            let added = section
                .added_lines
                .iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            let _ = write!(
                out,
                "// {}:{}-{} {} {}",
                self.file_path, section.start_line, section.end_line, section.kind, section.name
            );
            if let Some(option) = &section.component_option {
                let _ = write!(out, " in {}", option);
            }
            let _ = writeln!(out, " (added: {})", added);

            if let Some(summary) = &section.summary {
                let _ = writeln!(out, "// {}", summary);
            }
            out.push_str(&section.snippet);
            if !section.snippet.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }

        out
    }
}

/// A file path and the unified-diff text reported for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileDiff {
    pub path: String,
    pub diff: String,
}
