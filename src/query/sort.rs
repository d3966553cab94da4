//! Sort orchestration for question tables.
//!
//! Title, frequency and acceptance rate are sorted by the remote store.
//! Difficulty columns are never sent to the store: its ordering does not
//! follow Easy < Medium < Hard, so the page is ordered here after the read.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::types::{Difficulty, Record};

/// Sortable column of the question table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    Frequency,
    AcceptanceRate,
    RemoteDifficulty,
    UserDifficulty,
}

/// Where a sort is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortClass {
    /// Sent to the remote store with the read
    Delegated,
    /// Applied to the returned page
    Local,
}

impl SortField {
    /// All valid string representations of this enum.
    pub const ALL_STRINGS: &[&str] = &[
        "title",
        "frequency",
        "acceptance_rate",
        "remote_difficulty",
        "user_difficulty",
    ];

    pub fn class(self) -> SortClass {
        match self {
            SortField::Title | SortField::Frequency | SortField::AcceptanceRate => {
                SortClass::Delegated
            }
            SortField::RemoteDifficulty | SortField::UserDifficulty => SortClass::Local,
        }
    }

    pub fn is_delegated(self) -> bool {
        self.class() == SortClass::Delegated
    }

    /// Parameter name understood by the remote store
    pub fn wire_name(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Frequency => "frequency",
            SortField::AcceptanceRate => "acceptanceRate",
            SortField::RemoteDifficulty => "remoteDifficulty",
            SortField::UserDifficulty => "userDifficulty",
        }
    }
}

enum_display_fromstr!(SortField, TrackerError::invalid_sort_field, {
    Title => "title";
    Frequency => "frequency", alias "freq";
    AcceptanceRate => "acceptance_rate", alias "acceptance", alias "acceptancerate";
    RemoteDifficulty => "remote_difficulty", alias "difficulty", alias "remotedifficulty";
    UserDifficulty => "user_difficulty", alias "mine", alias "userdifficulty";
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

enum_display_fromstr!(SortOrder, TrackerError::invalid_sort_order, {
    Asc => "asc", alias "ascending";
    Desc => "desc", alias "descending";
});

/// Rank used for local difficulty ordering; unrated sorts first
pub fn difficulty_rank(difficulty: Option<Difficulty>) -> u8 {
    match difficulty {
        None => 0,
        Some(Difficulty::Easy) => 1,
        Some(Difficulty::Medium) => 2,
        Some(Difficulty::Hard) => 3,
    }
}

/// Order a fetched page by a locally sorted field.
///
/// The sort is stable and `Desc` reverses the comparison rather than the
/// result, so rows of equal rank keep their fetched order either way.
/// Delegated fields are left in the order the store returned them.
pub fn sort_locally(rows: &mut [Record], field: SortField, order: SortOrder) {
    let key: fn(&Record) -> u8 = match field {
        SortField::RemoteDifficulty => |r| difficulty_rank(Some(r.remote_difficulty)),
        SortField::UserDifficulty => |r| difficulty_rank(r.user_difficulty),
        _ => return,
    };

    rows.sort_by(|a, b| {
        let ordering = key(a).cmp(&key(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Compare two rows the way the remote store would for a delegated field.
///
/// Used by the in-memory store; ties fall back to the id so pages are
/// deterministic.
pub fn compare_delegated(a: &Record, b: &Record, field: SortField) -> Ordering {
    let ordering = match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Frequency => a.frequency.total_cmp(&b.frequency),
        SortField::AcceptanceRate => a.acceptance_rate.total_cmp(&b.acceptance_rate),
        SortField::RemoteDifficulty | SortField::UserDifficulty => Ordering::Equal,
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::types::QuestionId;

    fn row(id: u64, user: Option<Difficulty>) -> Record {
        Record {
            id: QuestionId(id),
            title: format!("Question {id}"),
            frequency: 0.0,
            acceptance_rate: 0.5,
            remote_difficulty: Difficulty::Medium,
            user_difficulty: user,
            solved: false,
            link: format!("https://example.com/{id}"),
            tags: vec![],
        }
    }

    fn ids(rows: &[Record]) -> Vec<u64> {
        rows.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn test_sort_field_classes() {
        assert!(SortField::Title.is_delegated());
        assert!(SortField::Frequency.is_delegated());
        assert!(SortField::AcceptanceRate.is_delegated());
        assert_eq!(SortField::RemoteDifficulty.class(), SortClass::Local);
        assert_eq!(SortField::UserDifficulty.class(), SortClass::Local);
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(
            SortField::from_str("acceptance_rate").unwrap(),
            SortField::AcceptanceRate
        );
        assert_eq!(SortField::from_str("Mine").unwrap(), SortField::UserDifficulty);
        assert!(SortField::from_str("created").is_err());
        for s in SortField::ALL_STRINGS {
            let parsed = SortField::from_str(s).unwrap();
            assert_eq!(&parsed.to_string(), s);
        }
    }

    #[test]
    fn test_user_difficulty_ascending_is_stable() {
        let mut rows = vec![
            row(1, Some(Difficulty::Hard)),
            row(2, Some(Difficulty::Easy)),
            row(3, Some(Difficulty::Easy)),
        ];
        sort_locally(&mut rows, SortField::UserDifficulty, SortOrder::Asc);
        assert_eq!(ids(&rows), vec![2, 3, 1]);
    }

    #[test]
    fn test_descending_reverses_comparison_not_sequence() {
        let mut rows = vec![
            row(1, Some(Difficulty::Easy)),
            row(2, Some(Difficulty::Hard)),
            row(3, Some(Difficulty::Easy)),
            row(4, None),
        ];
        sort_locally(&mut rows, SortField::UserDifficulty, SortOrder::Desc);
        // Ties (1, 3) keep fetched order
        assert_eq!(ids(&rows), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_unrated_sorts_before_easy() {
        let mut rows = vec![
            row(1, Some(Difficulty::Easy)),
            row(2, None),
            row(3, Some(Difficulty::Medium)),
        ];
        sort_locally(&mut rows, SortField::UserDifficulty, SortOrder::Asc);
        assert_eq!(ids(&rows), vec![2, 1, 3]);
    }

    #[test]
    fn test_toggling_twice_restores_tie_order() {
        let fetched = vec![
            row(5, Some(Difficulty::Medium)),
            row(6, Some(Difficulty::Easy)),
            row(7, Some(Difficulty::Medium)),
            row(8, Some(Difficulty::Easy)),
        ];
        let mut asc = fetched.clone();
        sort_locally(&mut asc, SortField::UserDifficulty, SortOrder::Asc);
        let mut desc = fetched.clone();
        sort_locally(&mut desc, SortField::UserDifficulty, SortOrder::Desc);
        let mut asc_again = fetched;
        sort_locally(&mut asc_again, SortField::UserDifficulty, SortOrder::Asc);

        assert_eq!(ids(&asc), vec![6, 8, 5, 7]);
        assert_eq!(ids(&desc), vec![5, 7, 6, 8]);
        assert_eq!(ids(&asc), ids(&asc_again));
    }

    #[test]
    fn test_delegated_field_is_left_alone() {
        let mut rows = vec![row(3, None), row(1, None), row(2, None)];
        sort_locally(&mut rows, SortField::Title, SortOrder::Desc);
        assert_eq!(ids(&rows), vec![3, 1, 2]);
    }

    #[test]
    fn test_compare_delegated_ties_break_on_id() {
        let a = row(2, None);
        let b = row(1, None);
        assert_eq!(
            compare_delegated(&a, &b, SortField::Frequency),
            Ordering::Greater
        );
    }
}
