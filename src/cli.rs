use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::query::{SortField, SortOrder};
use crate::types::{Difficulty, QuestionId, VALID_DIFFICULTIES, ViewKey};

#[derive(Parser)]
#[command(name = "qtrack")]
#[command(about = "Track interview question progress by company")]
#[command(version)]
pub struct Cli {
    /// Read questions from a JSON fixture instead of the remote store
    #[arg(long, global = true, value_name = "PATH")]
    pub fixture: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output formatting shared by every command
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one page of a company question list
    #[command(visible_alias = "b")]
    Browse {
        /// Company and bucket, e.g. google/six-months
        #[arg(value_parser = parse_view_key)]
        view: ViewKey,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Sort column: title, frequency, acceptance_rate, remote_difficulty, user_difficulty
        #[arg(short, long, value_parser = parse_sort_field)]
        sort: Option<SortField>,

        /// Sort order: asc or desc
        #[arg(long, default_value = "asc", value_parser = parse_sort_order)]
        order: SortOrder,

        /// Only titles containing this text
        #[arg(long)]
        search: Option<String>,

        /// Only questions with this tag
        #[arg(long)]
        tag: Option<String>,

        /// Hide solved questions
        #[arg(long)]
        unsolved: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Update one question
    Mark {
        /// Company and bucket the question is listed under
        #[arg(value_parser = parse_view_key)]
        view: ViewKey,

        /// Question ID
        id: QuestionId,

        #[command(flatten)]
        edit: EditArgs,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Apply the same update to several questions at once
    Batch {
        /// Company and bucket the questions are listed under
        #[arg(value_parser = parse_view_key)]
        view: ViewKey,

        /// Question IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<QuestionId>,

        /// Page holding the questions (selection is per page)
        #[arg(short, long, default_value = "1")]
        page: u32,

        #[command(flatten)]
        edit: EditArgs,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show overall progress
    Stats {
        #[command(flatten)]
        output: OutputOptions,
    },
}

/// Field edits accepted by `mark` and `batch`
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Mark as solved
    #[arg(long, conflicts_with = "unsolved")]
    pub solved: bool,

    /// Mark as not solved
    #[arg(long)]
    pub unsolved: bool,

    /// Your difficulty rating: easy, medium, hard, or none to clear it
    #[arg(short, long, value_parser = parse_rating)]
    pub difficulty: Option<Rating>,
}

/// A difficulty rating argument, where `none` clears the rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(pub Option<Difficulty>);

fn parse_view_key(s: &str) -> Result<ViewKey, String> {
    s.parse().map_err(|e: crate::error::TrackerError| e.to_string())
}

fn parse_sort_field(s: &str) -> Result<SortField, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid sort field. Must be one of: {}",
            SortField::ALL_STRINGS.join(", ")
        )
    })
}

fn parse_sort_order(s: &str) -> Result<SortOrder, String> {
    s.parse()
        .map_err(|_| "Invalid sort order. Must be one of: asc, desc".to_string())
}

fn parse_rating(s: &str) -> Result<Rating, String> {
    if s.trim().eq_ignore_ascii_case("none") {
        return Ok(Rating(None));
    }
    s.parse().map(|d| Rating(Some(d))).map_err(|_| {
        format!(
            "Invalid difficulty. Must be one of: {}, none",
            VALID_DIFFICULTIES.join(", ")
        )
    })
}
