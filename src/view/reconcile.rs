//! Merging write results into the loaded page.
//!
//! A write answers with a fragment for every record it touched, which may
//! include records of other company lists that are not loaded here. Only
//! `solved` and `user_difficulty` are taken from a fragment; the rest of the
//! row is left as it was read.

use std::collections::HashMap;

use crate::types::{Fragment, QuestionId, Record};

/// Apply fragments to matching rows in place. Returns how many rows changed.
///
/// Fragments without a loaded row are dropped. Row order is untouched.
pub fn reconcile(rows: &mut [Record], fragments: &[Fragment]) -> usize {
    if fragments.is_empty() {
        return 0;
    }

    // Last fragment wins if a store reports the same id twice
    let by_id: HashMap<QuestionId, &Fragment> = fragments.iter().map(|f| (f.id, f)).collect();

    let mut matched = 0;
    for row in rows.iter_mut() {
        if let Some(fragment) = by_id.get(&row.id) {
            row.solved = fragment.solved;
            row.user_difficulty = fragment.user_difficulty;
            matched += 1;
        }
    }
    matched
}

/// Drop solved rows; used while the unsolved-only filter is on
pub fn retain_unsolved(rows: &mut Vec<Record>) {
    rows.retain(|row| !row.solved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    fn row(id: u64, solved: bool) -> Record {
        Record {
            id: QuestionId(id),
            title: format!("Q{id}"),
            frequency: 1.0,
            acceptance_rate: 0.5,
            remote_difficulty: Difficulty::Medium,
            user_difficulty: None,
            solved,
            link: format!("q{id}"),
            tags: vec![],
        }
    }

    #[test]
    fn test_matching_fragment_replaces_user_fields_only() {
        let mut rows = vec![row(1, false), row(2, false)];
        let before = rows[0].clone();
        let matched = reconcile(
            &mut rows,
            &[Fragment {
                id: QuestionId(1),
                solved: true,
                user_difficulty: Some(Difficulty::Hard),
            }],
        );

        assert_eq!(matched, 1);
        assert!(rows[0].solved);
        assert_eq!(rows[0].user_difficulty, Some(Difficulty::Hard));
        assert_eq!(rows[0].title, before.title);
        assert_eq!(rows[0].remote_difficulty, before.remote_difficulty);
        assert_eq!(rows[1], row(2, false));
    }

    #[test]
    fn test_unmatched_fragment_is_ignored() {
        let mut rows = vec![row(1, false), row(2, true)];
        let before = rows.clone();
        let matched = reconcile(
            &mut rows,
            &[Fragment {
                id: QuestionId(42),
                solved: true,
                user_difficulty: Some(Difficulty::Easy),
            }],
        );
        assert_eq!(matched, 0);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_retain_unsolved_keeps_order() {
        let mut rows = vec![row(1, false), row(2, true), row(3, false)];
        retain_unsolved(&mut rows);
        let ids: Vec<u64> = rows.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
