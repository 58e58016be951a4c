//! Candidate units discovered during traversal

use crate::error::ExtractError;
use crate::types::UnitKind;
use tree_sitter::Node;

/// Display name for units without a resolvable name
pub const ANONYMOUS: &str = "<anonymous>";

/// A syntactic unit whose line range contains at least one added line.
///
/// Lives only between traversal and selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: UnitKind,
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Added lines inside `[start_line, end_line]`, ascending
    pub added_lines: Vec<usize>,
    pub component_option: Option<String>,
}

impl Candidate {
    /// Size in lines
    pub fn size(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// Closed mapping from tree-sitter node kinds to unit kinds.
///
/// Containers (programs, blocks, object literals, class bodies) never
/// qualify.
pub fn classify(node: Node) -> Option<UnitKind> {
    if !node.is_named() {
        return None;
    }

    let kind = match node.kind() {
        "function_declaration" | "generator_function_declaration" => UnitKind::FunctionDeclaration,
        "function_expression" | "function" | "generator_function" => UnitKind::FunctionExpression,
        "arrow_function" => UnitKind::ArrowFunction,
        "method_definition" => match node.parent().map(|p| p.kind()) {
            Some("class_body") => UnitKind::ClassMethod,
            _ => UnitKind::ObjectMethod,
        },
        "class_declaration" | "abstract_class_declaration" | "class" => UnitKind::ClassDeclaration,
        _ => return None,
    };
    Some(kind)
}

/// Resolve a display name.
///
/// Order: the node's own name, the variable it initializes, the key of the
/// property or field it is assigned to, then [`ANONYMOUS`].
pub fn resolve_name(node: Node, source: &str) -> Result<String, ExtractError> {
    if let Some(name) = node.child_by_field_name("name") {
        return key_text(name, source);
    }

    let Some(parent) = node.parent() else {
        return Ok(ANONYMOUS.to_string());
    };

    let is_value_of = |field: &str| {
        parent
            .child_by_field_name(field)
            .is_some_and(|value| value.id() == node.id())
    };

    match parent.kind() {
        "variable_declarator" if is_value_of("value") => {
            if let Some(name) = parent.child_by_field_name("name") {
                return key_text(name, source);
            }
        }
        "pair" if is_value_of("value") => {
            if let Some(key) = parent.child_by_field_name("key") {
                return key_text(key, source);
            }
        }
        "field_definition" if is_value_of("value") => {
            if let Some(property) = parent.child_by_field_name("property") {
                return key_text(property, source);
            }
        }
        "public_field_definition" if is_value_of("value") => {
            if let Some(name) = parent.child_by_field_name("name") {
                return key_text(name, source);
            }
        }
        "assignment_expression" if is_value_of("right") => {
            if let Some(left) = parent.child_by_field_name("left") {
                return key_text(left, source);
            }
        }
        _ => {}
    }

    Ok(ANONYMOUS.to_string())
}

/// Text of an identifier or property key; string and number literals yield
/// their value
pub fn key_text(node: Node, source: &str) -> Result<String, ExtractError> {
    let text = source.get(node.start_byte()..node.end_byte()).ok_or_else(|| {
        ExtractError::Traverse(format!(
            "{} span {}..{} outside source",
            node.kind(),
            node.start_byte(),
            node.end_byte()
        ))
    })?;

    let text = match node.kind() {
        "string" => text.trim_matches(|c| c == '"' || c == '\'' || c == '`'),
        _ => text,
    };
    Ok(text.to_string())
}
