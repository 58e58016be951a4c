//! Snippet size policy: hard character cut, then line windowing

use crate::config::AnalysisConfig;
use crate::types::TruncationReason;
use std::fmt::Write as _;

/// Marker appended to a snippet cut at the character limit
pub fn char_limit_marker(original_chars: usize) -> String {
    format!("\n/* ... truncated: original length {} chars */", original_chars)
}

/// Separator between non-contiguous windows
pub const ELISION_MARKER: &str = "  ... |";

/// Snippet text after the size policy was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    pub truncated: bool,
    pub reason: TruncationReason,
    pub summary: Option<String>,
}

/// Size limits for one source text.
///
/// `first_line` is the file line on which the text's line 1 sits, so windowed
/// snippets show file line numbers even for component regions.
#[derive(Debug, Clone, Copy)]
pub struct SnippetPolicy {
    max_chars: usize,
    max_lines: usize,
    radius: usize,
    first_line: usize,
}

impl SnippetPolicy {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            max_chars: config.max_snippet_chars,
            max_lines: config.max_block_lines,
            radius: config.window_radius,
            first_line: 1,
        }
    }

    pub fn with_first_line(mut self, first_line: usize) -> Self {
        self.first_line = first_line.max(1);
        self
    }

    /// Apply the policy to the raw text of a unit spanning
    /// `[start_line, end_line]`, windowing around `added`.
    pub fn apply(&self, raw: &str, start_line: usize, end_line: usize, added: &[usize]) -> Snippet {
        self.apply_with_lead("", raw, start_line, end_line, added)
    }

    /// Same as [`SnippetPolicy::apply`] for a unit that starts mid-line.
    ///
    /// `lead` is the text between the start of `start_line` and the unit. It
    /// only shows up in windowed snippets, which always print whole lines.
    pub fn apply_with_lead(
        &self,
        lead: &str,
        raw: &str,
        start_line: usize,
        end_line: usize,
        added: &[usize],
    ) -> Snippet {
        let char_len = raw.chars().count();
        if char_len > self.max_chars {
            let mut text: String = raw.chars().take(self.max_chars).collect();
            text.push_str(&char_limit_marker(char_len));
            return Snippet {
                text,
                truncated: true,
                reason: TruncationReason::CharLimit,
                summary: None,
            };
        }

        let line_count = end_line.saturating_sub(start_line) + 1;
        if line_count > self.max_lines {
            let whole_lines = format!("{}{}", lead, raw);
            return self.windowed(&whole_lines, start_line, end_line, added, line_count);
        }

        Snippet {
            text: raw.to_string(),
            truncated: false,
            reason: TruncationReason::None,
            summary: None,
        }
    }

    fn windowed(
        &self,
        raw: &str,
        start_line: usize,
        end_line: usize,
        added: &[usize],
        line_count: usize,
    ) -> Snippet {
        let lines: Vec<&str> = raw.split('\n').collect();
        let windows = merge_windows(added, start_line, end_line, self.radius);

        let mut text = String::new();
        for (i, (from, to)) in windows.iter().enumerate() {
            if i > 0 {
                text.push_str(ELISION_MARKER);
                text.push('\n');
            }
            for line in *from..=*to {
                let body = lines
                    .get(line - start_line)
                    .map(|l| l.trim_end_matches('\r'))
                    .unwrap_or("");
                let mark = if added.contains(&line) { '+' } else { ' ' };
                let _ = writeln!(text, "{}{:>5} | {}", mark, line + self.first_line - 1, body);
            }
        }
        if text.ends_with('\n') {
            text.pop();
        }

        Snippet {
            text,
            truncated: true,
            reason: TruncationReason::LineLimit,
            summary: Some(format!(
                "{} lines, showing {} window(s) of +/-{} lines around {} added line(s)",
                line_count,
                windows.len(),
                self.radius,
                added.len()
            )),
        }
    }
}

/// Inclusive line windows around each added line, clamped to the unit,
/// with overlapping or touching windows merged
fn merge_windows(added: &[usize], start_line: usize, end_line: usize, radius: usize) -> Vec<(usize, usize)> {
    let mut centers: Vec<usize> = added
        .iter()
        .copied()
        .filter(|l| (start_line..=end_line).contains(l))
        .collect();
    centers.sort_unstable();
    centers.dedup();

    let mut windows: Vec<(usize, usize)> = Vec::new();
    for center in centers {
        let from = center.saturating_sub(radius).max(start_line);
        let to = center.saturating_add(radius).min(end_line);
        match windows.last_mut() {
            Some(last) if from <= last.1 + 1 => last.1 = last.1.max(to),
            _ => windows.push((from, to)),
        }
    }
    windows
}
