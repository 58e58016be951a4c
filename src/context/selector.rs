//! Minimal-coverage selection over candidate units.
//!
//! Candidates are scanned smallest first; a candidate is kept when it holds
//! at least one added line no earlier pick covers. Equal sizes are ordered by
//! start line, then by discovery order, so the result never depends on sort
//! stability. Kept candidates come back in discovery order.

use super::candidate::Candidate;
use crate::diff::AddedLines;
use std::collections::BTreeSet;

/// A kept candidate and the added lines it is responsible for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub candidate: Candidate,
    /// Added lines first covered by this candidate, ascending
    pub accounts_for: Vec<usize>,
}

pub fn select_minimal_coverage(candidates: Vec<Candidate>, added: &AddedLines) -> Vec<Selected> {
    match candidates.len() {
        0 => return Vec::new(),
        1 => {
            return candidates
                .into_iter()
                .map(|candidate| Selected {
                    accounts_for: candidate.added_lines.clone(),
                    candidate,
                })
                .collect();
        }
        _ => {}
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| (candidates[i].size(), candidates[i].start_line, i));

    let mut covered: BTreeSet<usize> = BTreeSet::new();
    let mut picks: Vec<(usize, Vec<usize>)> = Vec::new();

    for i in order {
        let fresh: Vec<usize> = candidates[i]
            .added_lines
            .iter()
            .copied()
            .filter(|line| added.contains(*line) && !covered.contains(line))
            .collect();

        if fresh.is_empty() {
            continue;
        }
        covered.extend(fresh.iter().copied());
        picks.push((i, fresh));
    }

    picks.sort_by_key(|(i, _)| *i);

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    picks
        .into_iter()
        .filter_map(|(i, accounts_for)| {
            slots[i].take().map(|candidate| Selected {
                candidate,
                accounts_for,
            })
        })
        .collect()
}
