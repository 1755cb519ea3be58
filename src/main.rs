use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use baleen::config;
use baleen::import::ImportSummary;
use baleen::migrate::Migration;
use baleen::notion::NotionClient;
use baleen::trello::TrelloClient;

#[derive(Debug, Parser)]
#[command(author, version, about = "Migrate a Trello board into Notion databases")]
struct Args {
    /// Path to YAML config file
    #[arg(long, short, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Optional dotenv file holding TRELLO_API_KEY, TRELLO_TOKEN and NOTION_INTEGRATION_KEY
    #[arg(long, short, global = true)]
    env: Option<PathBuf>,

    /// Trello board name (defaults to app.board from the config)
    #[arg(long, short, global = true)]
    board: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export the board and import it into Notion
    Migrate {
        /// Do not keep a save file of the export
        #[arg(long)]
        no_save: bool,
    },
    /// Export the board into a save file only
    Export,
    /// Import cards from a save file written by `migrate` or `export`
    Import {
        /// Path of the save file
        #[arg(long)]
        save_path: PathBuf,
    },
    /// Archive all cards in the board's open lists
    Archive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if let Some(env) = &args.env {
        dotenvy::from_path(env)
            .with_context(|| format!("failed to load environment from {}", env.display()))?;
    }
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let trello = TrelloClient::new(cfg.trello.key.clone(), cfg.trello.token.clone());
    let notion = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());
    let migration = Migration::new(&cfg, &trello, &notion);
    let board = args.board.clone().unwrap_or_else(|| cfg.app.board.clone());

    match args.command {
        Command::Migrate { no_save } => {
            let summary = migration.migrate(&board, !no_save).await?;
            report(&summary);
        }
        Command::Export => {
            let path = migration.export(&board).await?;
            info!(path = %path.display(), "export complete; import it with `baleen import --save-path`");
        }
        Command::Import { save_path } => {
            let summary = migration.import_from_save(&save_path).await?;
            report(&summary);
        }
        Command::Archive => {
            let lists = migration.archive(&board).await?;
            info!(lists, board = %board, "archived board");
        }
    }
    Ok(())
}

fn report(summary: &ImportSummary) {
    match &summary.failure_file {
        Some(path) => warn!(
            created = summary.created,
            quarantined = summary.quarantined,
            path = %path.display(),
            "import finished with quarantined cards"
        ),
        None => info!(created = summary.created, "import finished"),
    }
}
