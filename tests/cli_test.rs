mod common;

use common::{FIXTURE, QtrackTest};
use serde_json::Value;

fn run_json(qtrack: &QtrackTest, args: &[&str]) -> Value {
    let fixture = qtrack.write_fixture(FIXTURE);
    let fixture = fixture.to_str().unwrap().to_string();
    let mut full = vec!["--fixture", fixture.as_str()];
    full.extend_from_slice(args);
    full.push("--json");
    let output = qtrack.run_success(&full);
    serde_json::from_str(&output).expect("command should print JSON")
}

fn row_ids(value: &Value) -> Vec<u64> {
    value["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_u64().unwrap())
        .collect()
}

// ============================================================================
// browse
// ============================================================================

#[test]
fn test_browse_lists_first_page() {
    let qtrack = QtrackTest::new();
    let page = run_json(&qtrack, &["browse", "google/all"]);

    assert_eq!(page["view"], "google/all");
    assert_eq!(page["page"], 1);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(row_ids(&page), vec![1, 2, 3]);
}

#[test]
fn test_browse_unsolved_hides_solved_rows() {
    let qtrack = QtrackTest::new();
    let page = run_json(&qtrack, &["browse", "google/all", "--unsolved"]);
    assert_eq!(row_ids(&page), vec![1, 2]);
}

#[test]
fn test_browse_sorts_by_frequency_descending() {
    let qtrack = QtrackTest::new();
    let page = run_json(
        &qtrack,
        &["browse", "google/all", "--sort", "frequency", "--order", "desc"],
    );
    assert_eq!(row_ids(&page), vec![1, 2, 3]);

    let page = run_json(&qtrack, &["browse", "google/all", "--sort", "frequency"]);
    assert_eq!(row_ids(&page), vec![3, 2, 1]);
}

#[test]
fn test_browse_sorts_by_catalog_difficulty_locally() {
    let qtrack = QtrackTest::new();
    let page = run_json(
        &qtrack,
        &["browse", "google/all", "--sort", "difficulty", "--order", "desc"],
    );
    assert_eq!(row_ids(&page), vec![3, 2, 1]);
}

#[test]
fn test_browse_filters_by_search_and_tag() {
    let qtrack = QtrackTest::new();
    let page = run_json(&qtrack, &["browse", "google/all", "--search", "ladder"]);
    assert_eq!(row_ids(&page), vec![3]);

    let page = run_json(&qtrack, &["browse", "google/all", "--tag", "design"]);
    assert_eq!(row_ids(&page), vec![2]);
}

#[test]
fn test_browse_uses_configured_page_size() {
    let qtrack = QtrackTest::new();
    qtrack.write_config("page_size: 2\n");

    let page = run_json(&qtrack, &["browse", "google/all", "--page", "2"]);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(row_ids(&page), vec![3]);
}

#[test]
fn test_browse_table_output() {
    let qtrack = QtrackTest::new();
    let fixture = qtrack.write_fixture(FIXTURE);
    let output = qtrack.run_success(&[
        "--fixture",
        fixture.to_str().unwrap(),
        "browse",
        "google/all",
    ]);
    assert!(output.contains("Two Sum"));
    assert!(output.contains("page 1 of 1"));
}

#[test]
fn test_browse_rejects_bad_view_key() {
    let qtrack = QtrackTest::new();
    let fixture = qtrack.write_fixture(FIXTURE);
    let stderr = qtrack.run_failure(&["--fixture", fixture.to_str().unwrap(), "browse", "google"]);
    assert!(stderr.contains("company/bucket"));
}

// ============================================================================
// mark / batch
// ============================================================================

#[test]
fn test_mark_solved_defaults_rating() {
    let qtrack = QtrackTest::new();
    let result = run_json(&qtrack, &["mark", "google/all", "1", "--solved"]);

    assert_eq!(result["matched"], 1);
    assert_eq!(result["row"]["solved"], true);
    assert_eq!(result["row"]["userDifficulty"], "Easy");
}

#[test]
fn test_mark_without_changes_fails() {
    let qtrack = QtrackTest::new();
    let fixture = qtrack.write_fixture(FIXTURE);
    let stderr = qtrack.run_failure(&[
        "--fixture",
        fixture.to_str().unwrap(),
        "mark",
        "google/all",
        "1",
    ]);
    assert!(stderr.contains("nothing to update"));
}

#[test]
fn test_batch_rates_selected_questions() {
    let qtrack = QtrackTest::new();
    let result = run_json(
        &qtrack,
        &["batch", "google/all", "1", "2", "--difficulty", "hard"],
    );

    assert_eq!(result["matched"], 2);
    for row in result["rows"].as_array().unwrap() {
        assert_eq!(row["userDifficulty"], "Hard");
    }
}

#[test]
fn test_batch_repeated_id_counts_once() {
    let qtrack = QtrackTest::new();
    let result = run_json(&qtrack, &["batch", "google/all", "2", "2", "--solved"]);

    assert_eq!(result["ids"], serde_json::json!([2]));
    assert_eq!(result["matched"], 1);
    assert_eq!(result["rows"][0]["solved"], true);
}

#[test]
fn test_batch_rejects_ids_not_on_page() {
    let qtrack = QtrackTest::new();
    let fixture = qtrack.write_fixture(FIXTURE);
    let stderr = qtrack.run_failure(&[
        "--fixture",
        fixture.to_str().unwrap(),
        "batch",
        "google/all",
        "1",
        "11",
        "--solved",
    ]);
    assert!(stderr.contains("not on page 1: 11"));
}

// ============================================================================
// stats
// ============================================================================

#[test]
fn test_stats_counts_each_question_once() {
    let qtrack = QtrackTest::new();
    let stats = run_json(&qtrack, &["stats"]);

    assert_eq!(stats["total"], 3);
    assert_eq!(stats["solved"], 1);
    assert_eq!(stats["hard"], 1);
}
