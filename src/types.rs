use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Identifier of one question instance in the remote store.
///
/// This is the only key used when merging write results into loaded rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for QuestionId {
    fn from(id: u64) -> Self {
        QuestionId(id)
    }
}

impl FromStr for QuestionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(QuestionId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

pub const VALID_DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];

enum_display_fromstr!(Difficulty, TrackerError::invalid_difficulty, {
    Easy => "easy", alias "e";
    Medium => "medium", alias "m", alias "med";
    Hard => "hard", alias "h";
});

/// Company and bucket (e.g. "google" / "six-months") identifying one question list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewKey {
    pub company: String,
    pub bucket: String,
}

impl ViewKey {
    pub fn new(company: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            bucket: bucket.into(),
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.company, self.bucket)
    }
}

impl FromStr for ViewKey {
    type Err = TrackerError;

    /// Parse "company/bucket"
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((company, bucket)) if !company.is_empty() && !bucket.is_empty() => {
                Ok(ViewKey::new(company, bucket))
            }
            _ => Err(TrackerError::InvalidViewKey(s.to_string())),
        }
    }
}

/// A question instance within one company/bucket context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: QuestionId,
    pub title: String,
    pub frequency: f64,
    /// Fraction in 0..=1
    pub acceptance_rate: f64,
    /// Catalog difficulty, never written by this client
    pub remote_difficulty: Difficulty,
    #[serde(default)]
    pub user_difficulty: Option<Difficulty>,
    #[serde(default)]
    pub solved: bool,
    pub link: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Per-record result of a write, as returned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: QuestionId,
    pub solved: bool,
    #[serde(default)]
    pub user_difficulty: Option<Difficulty>,
}

/// Partial update of the user-owned fields of a record.
///
/// `user_difficulty: Some(None)` clears the rating; `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_difficulty: Option<Option<Difficulty>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.solved.is_none() && self.user_difficulty.is_none()
    }
}

/// A single (field, value) edit made on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    Solved(bool),
    UserDifficulty(Option<Difficulty>),
}

impl From<FieldUpdate> for RecordPatch {
    fn from(update: FieldUpdate) -> Self {
        match update {
            FieldUpdate::Solved(solved) => RecordPatch {
                solved: Some(solved),
                ..Default::default()
            },
            FieldUpdate::UserDifficulty(difficulty) => RecordPatch {
                user_difficulty: Some(difficulty),
                ..Default::default()
            },
        }
    }
}

/// Solved counts across the whole store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total: u64,
    pub solved: u64,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
}

impl ProgressStats {
    pub fn record_solved(&mut self, difficulty: Difficulty) {
        self.solved += 1;
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Hard => self.hard += 1,
        }
    }
}
