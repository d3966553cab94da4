use owo_colors::OwoColorize;
use serde_json::json;

use crate::app::App;
use crate::cli::{EditArgs, OutputOptions};
use crate::commands::{print_json, print_question_table, read_result, write_result};
use crate::error::Result;
use crate::types::{FieldUpdate, QuestionId, ViewKey};

/// Update the solved flag and/or rating of one question
pub async fn cmd_mark(
    app: &App,
    view_key: ViewKey,
    id: QuestionId,
    edit: EditArgs,
    output: OutputOptions,
) -> Result<()> {
    let patch = edit.to_patch()?;
    let (view, read) = app.open_view(view_key);
    read_result(read.await)?;

    // One write per field, in the order a user would click them
    let mut updates = Vec::new();
    if let Some(solved) = patch.solved {
        updates.push(FieldUpdate::Solved(solved));
    }
    if let Some(rating) = patch.user_difficulty {
        updates.push(FieldUpdate::UserDifficulty(rating));
    }

    let mut matched = 0;
    for update in updates {
        matched = write_result(view.update_record(id, update).await)?;
    }

    let row = view.rows().into_iter().find(|r| r.id == id);
    view.close();

    if output.json {
        print_json(&json!({
            "id": id,
            "matched": matched,
            "row": row,
        }))?;
        return Ok(());
    }

    println!("Updated question {}", id.to_string().cyan());
    if let Some(row) = row {
        print_question_table(std::slice::from_ref(&row));
    }
    Ok(())
}
