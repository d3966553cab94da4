mod batch;
mod browse;
mod mark;
mod stats;

pub use batch::cmd_batch;
pub use browse::{BrowseOptions, cmd_browse};
pub use mark::cmd_mark;
pub use stats::cmd_stats;

use std::path::Path;
use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::app::App;
use crate::cli::EditArgs;
use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::remote::InMemoryStore;
use crate::types::{Difficulty, Record, RecordPatch};
use crate::view::{FetchOutcome, WriteOutcome};

/// Build the application against a fixture file or the configured remote store
pub fn build_app(fixture: Option<&Path>) -> Result<App> {
    let config = Config::load()?;
    match fixture {
        Some(path) => {
            let store = InMemoryStore::from_fixture(path)?;
            Ok(App::new(config, Arc::new(store)))
        }
        None => App::connect(config),
    }
}

/// Turn a settled read into a command result
pub(crate) fn read_result(outcome: FetchOutcome) -> Result<()> {
    match outcome {
        FetchOutcome::Applied | FetchOutcome::Stale => Ok(()),
        FetchOutcome::Failed(err) => Err(err),
    }
}

/// Turn a settled write into a command result carrying the matched row count
pub(crate) fn write_result(outcome: WriteOutcome) -> Result<usize> {
    match outcome {
        WriteOutcome::Applied { matched } => Ok(matched),
        WriteOutcome::Skipped => Ok(0),
        WriteOutcome::Rejected(err) => Err(err),
    }
}

impl EditArgs {
    /// The record patch described by the flags; errors if no flag was given
    pub fn to_patch(&self) -> Result<RecordPatch> {
        let solved = match (self.solved, self.unsolved) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        let patch = RecordPatch {
            solved,
            user_difficulty: self.difficulty.map(|rating| rating.0),
        };
        if patch.is_empty() {
            return Err(TrackerError::NothingToUpdate);
        }
        Ok(patch)
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A row in the question table
#[derive(Tabled)]
struct QuestionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Freq")]
    frequency: String,
    #[tabled(rename = "Accept")]
    acceptance: String,
    #[tabled(rename = "Difficulty")]
    difficulty: String,
    #[tabled(rename = "Mine")]
    mine: String,
    #[tabled(rename = "Solved")]
    solved: String,
}

fn colored_difficulty(difficulty: Difficulty) -> String {
    let label = difficulty.to_string();
    match difficulty {
        Difficulty::Easy => label.green().to_string(),
        Difficulty::Medium => label.yellow().to_string(),
        Difficulty::Hard => label.red().to_string(),
    }
}

pub(crate) fn print_question_table(rows: &[Record]) {
    let table_rows: Vec<QuestionRow> = rows
        .iter()
        .map(|record| QuestionRow {
            id: record.id.to_string().cyan().to_string(),
            title: record.title.clone(),
            frequency: format!("{:.1}", record.frequency),
            acceptance: format!("{:.0}%", record.acceptance_rate * 100.0),
            difficulty: colored_difficulty(record.remote_difficulty),
            mine: record
                .user_difficulty
                .map(colored_difficulty)
                .unwrap_or_else(|| "-".dimmed().to_string()),
            solved: if record.solved {
                "yes".green().to_string()
            } else {
                "no".dimmed().to_string()
            },
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
}
