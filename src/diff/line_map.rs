use super::added_lines::AddedLines;
use super::hunk::HunkHeader;
use crate::error::DiffError;
use serde::{Deserialize, Serialize};

/// How a diff line relates the old and new file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineKind {
    Added,
    Removed,
    Context,
}

/// One diff-text line inside a hunk with its resolved line numbers.
///
/// `position` is the 1-based line index within the diff text. Added lines
/// only carry `new_line`, removed lines only `old_line`, context lines both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LineMapEntry {
    pub position: usize,
    pub kind: DiffLineKind,
    pub old_line: Option<usize>,
    pub new_line: Option<usize>,
    pub text: String,
}

/// Line table for a single hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HunkLineMap {
    pub header: HunkHeader,
    pub entries: Vec<LineMapEntry>,
}

impl HunkLineMap {
    pub fn old_start(&self) -> usize {
        self.header.old_start
    }

    pub fn new_start(&self) -> usize {
        self.header.new_start
    }
}

/// Old/new line tables for every hunk of one file's diff.
///
/// Building never fails: a malformed hunk header contributes nothing and the
/// result is the union of the hunks that did parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DiffLineMap {
    pub hunks: Vec<HunkLineMap>,
}

impl DiffLineMap {
    pub fn build(diff_text: &str) -> Self {
        let mut hunks: Vec<HunkLineMap> = Vec::new();

        for event in HunkScanner::new(diff_text) {
            match event {
                ScanEvent::Header(header) => hunks.push(HunkLineMap {
                    header,
                    entries: Vec::new(),
                }),
                ScanEvent::Line(entry) => {
                    if let Some(hunk) = hunks.last_mut() {
                        hunk.entries.push(entry);
                    }
                }
            }
        }

        Self { hunks }
    }

    /// Like [`DiffLineMap::build`], but a malformed `@@` header or a diff
    /// without any hunk is an error instead of being skipped
    pub fn build_strict(diff_text: &str) -> Result<Self, DiffError> {
        for line in diff_text.lines().filter(|l| l.starts_with("@@")) {
            HunkHeader::parse(line)?;
        }

        let map = Self::build(diff_text);
        if map.is_empty() {
            return Err(DiffError::Empty);
        }
        Ok(map)
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LineMapEntry> {
        self.hunks.iter().flat_map(|h| h.entries.iter())
    }

    /// New-file lines of every added entry
    pub fn added_lines(&self) -> AddedLines {
        self.entries()
            .filter(|e| e.kind == DiffLineKind::Added)
            .filter_map(|e| e.new_line)
            .collect()
    }

    /// Text of a new-file line, if the diff shows it
    pub fn new_line_text(&self, line: usize) -> Option<&str> {
        self.entries()
            .find(|e| e.new_line == Some(line))
            .map(|e| e.text.as_str())
    }

    /// Text of an old-file line, if the diff shows it
    pub fn old_line_text(&self, line: usize) -> Option<&str> {
        self.entries()
            .find(|e| e.old_line == Some(line))
            .map(|e| e.text.as_str())
    }
}

/// Ordered `(diff position, new-file line)` pairs for every `+` line inside a
/// hunk. Duplicates are kept; [`AddedLines`] deduplicates.
pub fn added_line_positions(diff_text: &str) -> Vec<(usize, usize)> {
    HunkScanner::new(diff_text)
        .filter_map(|event| match event {
            ScanEvent::Line(LineMapEntry {
                position,
                kind: DiffLineKind::Added,
                new_line: Some(line),
                ..
            }) => Some((position, line)),
            _ => None,
        })
        .collect()
}

enum ScanEvent {
    Header(HunkHeader),
    Line(LineMapEntry),
}

struct HunkCursor {
    old_line: usize,
    new_line: usize,
    old_remaining: usize,
    new_remaining: usize,
}

impl HunkCursor {
    fn new(header: &HunkHeader) -> Self {
        Self {
            old_line: header.old_start,
            new_line: header.new_start,
            old_remaining: header.old_len,
            new_remaining: header.new_len,
        }
    }

    fn exhausted(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }
}

/// Walks diff text and yields hunk headers and in-hunk lines.
///
/// Text before the first valid `@@` header (`diff --git`, `index`, `---`,
/// `+++`, `new file mode`, ...) is never hunk content. A hunk ends when both
/// header counts are consumed, at `diff --git`, or at the next `@@` line.
struct HunkScanner<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    cursor: Option<HunkCursor>,
}

impl<'a> HunkScanner<'a> {
    fn new(diff_text: &'a str) -> Self {
        Self {
            lines: diff_text.lines().enumerate(),
            cursor: None,
        }
    }
}

impl Iterator for HunkScanner<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        for (idx, raw) in self.lines.by_ref() {
            let position = idx + 1;

            if raw.starts_with("@@") {
                match HunkHeader::try_parse(raw) {
                    Some(header) => {
                        self.cursor = Some(HunkCursor::new(&header));
                        return Some(ScanEvent::Header(header));
                    }
                    None => {
                        tracing::debug!("Skipping malformed hunk header at line {}", position);
                        self.cursor = None;
                        continue;
                    }
                }
            }

            if raw.starts_with("diff --git") {
                self.cursor = None;
                continue;
            }

            let Some(cursor) = self.cursor.as_mut() else {
                continue;
            };

            // "\ No newline at end of file"
            if raw.starts_with('\\') {
                continue;
            }

            if cursor.exhausted() {
                tracing::debug!(
                    "Hunk header counts used up before line {}; ignoring the rest of the hunk",
                    position
                );
                self.cursor = None;
                continue;
            }

            let entry = if let Some(text) = raw.strip_prefix('+') {
                let entry = LineMapEntry {
                    position,
                    kind: DiffLineKind::Added,
                    old_line: None,
                    new_line: Some(cursor.new_line),
                    text: text.to_string(),
                };
                cursor.new_line += 1;
                cursor.new_remaining = cursor.new_remaining.saturating_sub(1);
                entry
            } else if let Some(text) = raw.strip_prefix('-') {
                let entry = LineMapEntry {
                    position,
                    kind: DiffLineKind::Removed,
                    old_line: Some(cursor.old_line),
                    new_line: None,
                    text: text.to_string(),
                };
                cursor.old_line += 1;
                cursor.old_remaining = cursor.old_remaining.saturating_sub(1);
                entry
            } else {
                // Context; some tools strip the leading space of blank lines
                let text = raw.strip_prefix(' ').unwrap_or(raw);
                let entry = LineMapEntry {
                    position,
                    kind: DiffLineKind::Context,
                    old_line: Some(cursor.old_line),
                    new_line: Some(cursor.new_line),
                    text: text.to_string(),
                };
                cursor.old_line += 1;
                cursor.new_line += 1;
                cursor.old_remaining = cursor.old_remaining.saturating_sub(1);
                cursor.new_remaining = cursor.new_remaining.saturating_sub(1);
                entry
            };

            return Some(ScanEvent::Line(entry));
        }

        None
    }
}
