//! Which option of a component's default export a unit is declared in

use crate::context::candidate::key_text;
use crate::error::ExtractError;
use tree_sitter::Node;

/// Upper bound on parent steps taken from a unit towards the options object
pub const MAX_ANCESTOR_HOPS: usize = 8;

/// Name of the `export default { ... }` option (`methods`, `computed`,
/// `setup`, ...) that encloses `node`.
///
/// Walks at most [`MAX_ANCESTOR_HOPS`] parents. `Ok(None)` means no options
/// object was reached within the bound.
pub fn probe_component_option(node: Node, source: &str) -> Result<Option<String>, ExtractError> {
    let mut current = node;

    for _ in 0..MAX_ANCESTOR_HOPS {
        let Some(parent) = current.parent() else {
            return Ok(None);
        };

        if is_options_root(parent) {
            return option_name(current, source);
        }
        current = parent;
    }

    Ok(None)
}

/// `export default { ... }` or `export default wrap({ ... })`
fn is_options_root(node: Node) -> bool {
    if node.kind() != "object" {
        return false;
    }

    match node.parent() {
        Some(parent) if parent.kind() == "export_statement" => is_default_export(parent),
        Some(parent) if parent.kind() == "arguments" => parent
            .parent()
            .filter(|call| call.kind() == "call_expression")
            .and_then(|call| call.parent())
            .is_some_and(|export| export.kind() == "export_statement" && is_default_export(export)),
        _ => false,
    }
}

fn is_default_export(export: Node) -> bool {
    let mut cursor = export.walk();
    let found = export
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == "default");
    found
}

/// Key of a direct member of the options object
fn option_name(member: Node, source: &str) -> Result<Option<String>, ExtractError> {
    let key = match member.kind() {
        "pair" => member.child_by_field_name("key"),
        "method_definition" => member.child_by_field_name("name"),
        _ => None,
    };

    key.map(|k| key_text(k, source)).transpose()
}
