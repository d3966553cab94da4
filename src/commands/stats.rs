use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::app::App;
use crate::cli::OutputOptions;
use crate::commands::print_json;
use crate::error::{Result, TrackerError};
use crate::types::ProgressStats;

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Difficulty")]
    label: String,
    #[tabled(rename = "Solved")]
    solved: u64,
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Print overall progress
pub async fn cmd_stats(app: &App, output: OutputOptions) -> Result<()> {
    let stats: ProgressStats = app
        .progress()
        .await
        .ok_or_else(|| TrackerError::TransientFetch("progress unavailable".to_string()))?;

    if output.json {
        return print_json(&stats);
    }

    let rows = vec![
        StatsRow {
            label: "easy".green().to_string(),
            solved: stats.easy,
        },
        StatsRow {
            label: "medium".yellow().to_string(),
            solved: stats.medium,
        },
        StatsRow {
            label: "hard".red().to_string(),
            solved: stats.hard,
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    println!(
        "\n{} of {} solved ({:.1}%)",
        stats.solved.to_string().bold(),
        stats.total,
        percent(stats.solved, stats.total)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_handles_empty_store() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }
}
