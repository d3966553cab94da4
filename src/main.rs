use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use qtrack::cli::{Cli, Commands};
use qtrack::commands::{BrowseOptions, build_app, cmd_batch, cmd_browse, cmd_mark, cmd_stats};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let app = match build_app(cli.fixture.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Browse {
            view,
            page,
            sort,
            order,
            search,
            tag,
            unsolved,
            output,
        } => {
            let options = BrowseOptions {
                view,
                page,
                sort,
                order,
                search,
                tag,
                unsolved,
            };
            cmd_browse(&app, options, output).await
        }
        Commands::Mark {
            view,
            id,
            edit,
            output,
        } => cmd_mark(&app, view, id, edit, output).await,
        Commands::Batch {
            view,
            ids,
            page,
            edit,
            output,
        } => cmd_batch(&app, view, page, ids, edit, output).await,
        Commands::Stats { output } => cmd_stats(&app, output).await,
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
