use std::collections::BTreeSet;

use owo_colors::OwoColorize;
use serde_json::json;

use crate::app::App;
use crate::cli::{EditArgs, OutputOptions};
use crate::commands::{print_json, print_question_table, read_result, write_result};
use crate::error::{Result, TrackerError};
use crate::query::PageQuery;
use crate::types::{QuestionId, ViewKey};

/// Select questions on one page and update them in a single write
pub async fn cmd_batch(
    app: &App,
    view_key: ViewKey,
    page: u32,
    ids: Vec<QuestionId>,
    edit: EditArgs,
    output: OutputOptions,
) -> Result<()> {
    let patch = edit.to_patch()?;
    let query = PageQuery::new(view_key, app.config().page_size).with_page(page);
    let (view, read) = app.open_query(query);
    read_result(read.await)?;

    let ids: BTreeSet<QuestionId> = ids.into_iter().collect();
    let mut missing = Vec::new();
    for &id in &ids {
        if !view.toggle_selected(id) {
            missing.push(id.to_string());
        }
    }
    if !missing.is_empty() {
        view.close();
        return Err(TrackerError::NotOnPage {
            page,
            ids: missing.join(", "),
        });
    }

    if let Some(rating) = patch.user_difficulty {
        view.choose_batch_difficulty(rating);
    }
    let matched = write_result(view.batch_update(patch).await)?;

    let rows: Vec<_> = view
        .rows()
        .into_iter()
        .filter(|r| ids.contains(&r.id))
        .collect();
    view.close();

    if output.json {
        print_json(&json!({
            "ids": ids,
            "matched": matched,
            "rows": rows,
        }))?;
        return Ok(());
    }

    println!("Updated {} question(s)", matched.to_string().cyan());
    if !rows.is_empty() {
        print_question_table(&rows);
    }
    Ok(())
}
