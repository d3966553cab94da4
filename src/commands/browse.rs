use owo_colors::OwoColorize;
use serde_json::json;

use crate::app::App;
use crate::cli::OutputOptions;
use crate::commands::{print_json, print_question_table, read_result};
use crate::error::Result;
use crate::query::{PageQuery, SortField, SortOrder};
use crate::types::ViewKey;

/// Options for the browse command
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    pub view: ViewKey,
    pub page: u32,
    pub sort: Option<SortField>,
    pub order: SortOrder,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub unsolved: bool,
}

impl BrowseOptions {
    /// The page query these options describe
    pub fn to_query(&self, page_size: u32) -> PageQuery {
        PageQuery::new(self.view.clone(), page_size)
            .with_sort(self.sort, self.order)
            .with_search(self.search.as_deref().unwrap_or_default())
            .with_tag_filter(self.tag.as_deref())
            .with_unsolved_only(self.unsolved)
            .with_page(self.page)
    }
}

/// Print one page of a company question list
pub async fn cmd_browse(app: &App, options: BrowseOptions, output: OutputOptions) -> Result<()> {
    let query = options.to_query(app.config().page_size);
    let (view, read) = app.open_query(query);
    read_result(read.await)?;

    let snapshot = view.snapshot();
    view.close();

    if output.json {
        print_json(&json!({
            "view": snapshot.query.view_key.to_string(),
            "page": snapshot.query.page,
            "totalPages": snapshot.total_pages,
            "rows": snapshot.rows,
        }))?;
        return Ok(());
    }

    if snapshot.rows.is_empty() {
        println!("No questions found.");
        return Ok(());
    }

    print_question_table(&snapshot.rows);
    println!(
        "\n{} page {} of {}",
        snapshot.query.view_key.to_string().bold(),
        snapshot.query.page,
        snapshot.total_pages
    );
    Ok(())
}
