use super::language::ScriptLang;
use crate::error::ExtractError;
use tree_sitter::{Node, Parser, Tree};

/// Diagnostics kept per parse; further syntax errors are only counted
const MAX_DIAGNOSTICS: usize = 20;

/// Kind of syntax problem tree-sitter recovered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Input skipped by error recovery
    Error,
    /// Token the parser had to insert
    Missing,
}

/// Location of a recovered syntax error (1-based line, 0-based column)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub column: usize,
    pub node_kind: String,
}

/// Parser output: a possibly partial tree plus what recovery had to do
pub struct ParsedSource {
    pub tree: Tree,
    pub diagnostics: Vec<Diagnostic>,
    /// Total number of error/missing nodes, including ones not kept
    pub error_count: usize,
}

impl ParsedSource {
    pub fn is_clean(&self) -> bool {
        self.error_count == 0
    }
}

/// Error-tolerant parser for one script grammar
pub struct AstParser {
    parser: Parser,
    lang: ScriptLang,
}

impl AstParser {
    /// Create a new AST parser for the given grammar
    pub fn new(lang: ScriptLang) -> Result<Self, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&lang.tree_sitter_language())
            .map_err(|e| ExtractError::Parse(format!("failed to load {} grammar: {}", lang.name(), e)))?;

        Ok(Self { parser, lang })
    }

    /// Parse source text.
    ///
    /// Recovered syntax errors are reported through `diagnostics`. A tree
    /// whose top level consists only of error nodes is rejected.
    pub fn parse(&mut self, source: &str) -> Result<ParsedSource, ExtractError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::Parse(format!("{} parser produced no tree", self.lang.name())))?;

        let root = tree.root_node();
        let (diagnostics, error_count) = if root.has_error() {
            collect_diagnostics(root)
        } else {
            (Vec::new(), 0)
        };

        if is_unusable(root) {
            let location = diagnostics
                .first()
                .map(|d| format!(" (first at {}:{})", d.line, d.column))
                .unwrap_or_default();
            return Err(ExtractError::Parse(format!(
                "no usable {} syntax tree, {} syntax error(s){}",
                self.lang.name(),
                error_count,
                location
            )));
        }

        Ok(ParsedSource {
            tree,
            diagnostics,
            error_count,
        })
    }

    /// Get the language name
    pub fn language_name(&self) -> &str {
        self.lang.name()
    }
}

fn is_unusable(root: Node) -> bool {
    if root.is_error() {
        return true;
    }
    let mut cursor = root.walk();
    let mut named = root.named_children(&mut cursor).peekable();
    named.peek().is_some() && named.all(|child| child.is_error())
}

/// Walk only the subtrees that contain errors
fn collect_diagnostics(root: Node) -> (Vec<Diagnostic>, usize) {
    let mut diagnostics = Vec::new();
    let mut count = 0;
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            count += 1;
            if diagnostics.len() < MAX_DIAGNOSTICS {
                let position = node.start_position();
                diagnostics.push(Diagnostic {
                    kind: if node.is_missing() {
                        DiagnosticKind::Missing
                    } else {
                        DiagnosticKind::Error
                    },
                    line: position.row + 1,
                    column: position.column,
                    node_kind: node.kind().to_string(),
                });
            }
        }

        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return (diagnostics, count);
            }
        }
    }
}
