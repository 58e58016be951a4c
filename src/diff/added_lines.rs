use super::line_map::added_line_positions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of new-file line numbers introduced or modified by a diff.
///
/// Built once per file and only read afterwards. Iteration is ascending.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(transparent)]
pub struct AddedLines(BTreeSet<usize>);

impl AddedLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the new-file line of every `+` line inside a hunk
    pub fn from_diff(diff_text: &str) -> Self {
        added_line_positions(diff_text)
            .into_iter()
            .map(|(_, line)| line)
            .collect()
    }

    pub fn contains(&self, line: usize) -> bool {
        self.0.contains(&line)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Whether any added line falls inside `[start, end]`
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        start <= end && self.0.range(start..=end).next().is_some()
    }

    /// Added lines inside the inclusive range `[start, end]`
    pub fn within(&self, start: usize, end: usize) -> Vec<usize> {
        if start > end {
            return Vec::new();
        }
        self.0.range(start..=end).copied().collect()
    }

    /// Remap into the local coordinates of a region starting at `offset`.
    /// Lines before the region are dropped.
    pub fn localize(&self, offset: usize) -> Self {
        self.iter()
            .filter_map(|g| global_to_local(g, offset))
            .collect()
    }
}

impl FromIterator<usize> for AddedLines {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|line| *line > 0).collect())
    }
}

impl<'a> IntoIterator for &'a AddedLines {
    type Item = &'a usize;
    type IntoIter = std::collections::btree_set::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// `local = global - offset + 1`, or `None` for lines before the region
pub fn global_to_local(global: usize, offset: usize) -> Option<usize> {
    if offset == 0 || global < offset {
        return None;
    }
    Some(global - offset + 1)
}

/// Inverse of [`global_to_local`]
pub fn local_to_global(local: usize, offset: usize) -> usize {
    local + offset - 1
}
