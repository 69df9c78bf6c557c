//! Fuzzy command hints.
//!
//! A candidate matches a query when every query character appears in the
//! candidate in order. The distance of a match is the number of candidate
//! characters skipped before the last query character lands; whatever
//! follows the last matched character is free, since the user is usually
//! typing a prefix of what they want.

use crate::candidates::CandidateSet;

/// Maximum number of hints shown under the prompt.
pub const MAX_HINTS: usize = 5;

/// Fuzzy distance between `query` and `candidate`, or `None` when the query
/// is not a subsequence of the candidate.
pub fn distance(query: &str, candidate: &str) -> Option<usize> {
    let mut skipped = 0;
    let mut chars = candidate.chars();

    for wanted in query.chars() {
        loop {
            match chars.next() {
                Some(c) if c == wanted => break,
                Some(_) => skipped += 1,
                None => return None,
            }
        }
    }

    Some(skipped)
}

/// Rank `candidates` against `query`, best first.
///
/// Matches are ordered by distance, then by length, then by name. The walk
/// stops at the first match whose distance exceeds `len(query) + 1`, and
/// never returns more than [`MAX_HINTS`] entries.
pub fn rank(candidates: &CandidateSet, query: &str) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(usize, &str)> = candidates
        .iter()
        .filter_map(|name| distance(query, name).map(|d| (d, name)))
        .collect();
    matches.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.chars().count().cmp(&b.1.chars().count()))
            .then_with(|| a.1.cmp(b.1))
    });

    let limit = query.chars().count() + 1;
    matches
        .into_iter()
        .take_while(|(d, _)| *d <= limit)
        .take(MAX_HINTS)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// The hint row under the live prompt: the ranked suggestions for the last
/// query seen plus a cursor into them.
#[derive(Debug, Clone, Default)]
pub struct HintList {
    query: String,
    hints: Vec<String>,
    cursor: usize,
}

impl HintList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-rank against `query`. Nothing happens when the query is the one
    /// already ranked, so the cursor survives events that don't edit text.
    pub fn refresh(&mut self, candidates: &CandidateSet, query: &str) {
        if query == self.query {
            return;
        }
        self.query = query.to_string();
        self.hints = rank(candidates, query);
        self.cursor = 0;
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn selected(&self) -> Option<&str> {
        self.hints.get(self.cursor).map(String::as_str)
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor + 1 < self.hints.len() {
            self.cursor += 1;
        }
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.hints.clear();
        self.cursor = 0;
    }
}
