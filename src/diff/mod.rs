//! Unified-diff line mapping
//!
//! Turns the hunk text a code host reports for one file into old/new line
//! number tables and the set of new-file lines the change introduced.

/// Ordered, deduplicated set of added new-file line numbers
pub mod added_lines;
/// `@@ -a,b +c,d @@` header parsing
pub mod hunk;
/// Per-hunk old/new line tables
pub mod line_map;

pub use added_lines::AddedLines;
pub use hunk::HunkHeader;
pub use line_map::{DiffLineKind, DiffLineMap, HunkLineMap, LineMapEntry, added_line_positions};
