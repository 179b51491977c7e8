use crate::data::types::Category;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub const MIN_PATTERN_LEN: usize = 2;
pub const MAX_PATTERN_LEN: usize = 5;

/// A category subsequence that recurs in the pattern window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub categories: Vec<Category>,
    pub occurrences: usize,
    /// Window index of the last occurrence found by the left-to-right scan.
    pub last_seen: usize,
}

impl PatternMatch {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// If the newest `len - 1` categories of `window` equal the head of this
    /// pattern, returns the category the pattern implies next.
    pub fn continuation(&self, window: &[Category]) -> Option<Category> {
        let (last, head) = self.categories.split_last()?;
        if window.len() < head.len() || &window[..head.len()] != head {
            return None;
        }
        Some(*last)
    }
}

/// Holds the ranked pattern table for the current cycle.
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    table: Vec<PatternMatch>,
}

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the table from scratch for `window` (newest first).
    pub fn analyze(&mut self, window: &[Category]) -> &[PatternMatch] {
        self.table = find_patterns(window);
        &self.table
    }

    pub fn top(&self) -> Option<&PatternMatch> {
        self.table.first()
    }

    pub fn table(&self) -> &[PatternMatch] {
        &self.table
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

/// Every subsequence of length 2..=5 occurring at least twice, ranked by
/// occurrence count (descending) then by last occurrence index (descending).
pub fn find_patterns(window: &[Category]) -> Vec<PatternMatch> {
    let mut matches: Vec<PatternMatch> = Vec::new();

    for len in MIN_PATTERN_LEN..=MAX_PATTERN_LEN {
        if window.len() < len {
            break;
        }
        for start in 0..=window.len() - len {
            let candidate = &window[start..start + len];
            if matches.iter().any(|m| m.categories == candidate) {
                continue;
            }
            let (occurrences, last_seen) = count_occurrences(window, candidate);
            if occurrences > 1 {
                matches.push(PatternMatch {
                    categories: candidate.to_vec(),
                    occurrences,
                    last_seen,
                });
            }
        }
    }

    // Stable sort keeps discovery order (shorter patterns first) for full ties.
    matches.sort_by_key(|m| (Reverse(m.occurrences), Reverse(m.last_seen)));
    matches
}

/// Overlapping scan: after each hit the search resumes one position later.
fn count_occurrences(window: &[Category], pattern: &[Category]) -> (usize, usize) {
    let mut count = 0;
    let mut last_seen = 0;
    let mut pos = 0;
    while pos + pattern.len() <= window.len() {
        match window[pos..]
            .windows(pattern.len())
            .position(|w| w == pattern)
        {
            Some(offset) => {
                count += 1;
                last_seen = pos + offset;
                pos = last_seen + 1;
            }
            None => break,
        }
    }
    (count, last_seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use Category::{High as H, Low as L};

    #[test]
    fn test_overlapping_occurrences() {
        assert_eq!(count_occurrences(&[H, H, H, L], &[H, H]), (2, 1));
        assert_eq!(count_occurrences(&[L, H, L, H, L], &[L, H, L]), (2, 2));
        assert_eq!(count_occurrences(&[H], &[H, H]), (0, 0));
    }

    #[test]
    fn test_top_pattern_repeated_run() {
        let window = [H, H, H, L, L];
        let patterns = find_patterns(&window);
        let top = &patterns[0];

        assert_eq!(top.categories, vec![H, H]);
        assert_eq!(top.occurrences, 2);
        assert_eq!(top.continuation(&window), Some(H));
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn test_ties_rank_later_occurrence_first() {
        // LH, HL and LHL all occur twice; HL was last seen at index 3.
        let window = [L, H, L, H, L];
        let patterns = find_patterns(&window);

        assert_eq!(patterns[0].categories, vec![H, L]);
        assert_eq!(patterns[0].last_seen, 3);
        assert_eq!(patterns[0].continuation(&window), None);
        assert!(patterns.iter().all(|p| p.occurrences >= 2));
    }

    #[test]
    fn test_short_windows() {
        assert!(find_patterns(&[]).is_empty());
        assert!(find_patterns(&[H]).is_empty());
        assert!(find_patterns(&[H, L]).is_empty());
    }

    #[test]
    fn test_analyzer_table_lifecycle() {
        let mut analyzer = PatternAnalyzer::new();
        analyzer.analyze(&[H, H, H]);
        assert!(analyzer.top().is_some());
        analyzer.clear();
        assert!(analyzer.top().is_none());
    }

    fn category() -> impl Strategy<Value = Category> {
        prop_oneof![Just(H), Just(L)]
    }

    proptest! {
        #[test]
        fn analysis_is_idempotent(window in proptest::collection::vec(category(), 0..30)) {
            prop_assert_eq!(find_patterns(&window), find_patterns(&window));
        }

        #[test]
        fn matches_are_ranked(window in proptest::collection::vec(category(), 0..30)) {
            let patterns = find_patterns(&window);
            for pair in patterns.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.occurrences > b.occurrences
                    || (a.occurrences == b.occurrences && a.last_seen >= b.last_seen));
            }
            for p in &patterns {
                prop_assert!(p.occurrences >= 2);
                prop_assert!((MIN_PATTERN_LEN..=MAX_PATTERN_LEN).contains(&p.len()));
            }
        }
    }
}
