use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use baleen::config;
use baleen::notion::NotionClient;

/// Print the databases the integration can see, to fill in `notion.databases`.
#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Only the Notion section matters here; Trello credentials may be absent.
    let cfg = config::read(Some(&args.config))?;
    config::validate_notion(&cfg.notion)?;
    let client = NotionClient::new(cfg.notion.token.clone(), cfg.notion.version.clone());

    let databases = client.search_databases().await?;
    println!("Databases:");
    for db in &databases {
        let mapped = cfg.notion.databases.values().any(|t| t == &db.title);
        println!(
            "  {} -> {}{}",
            db.title,
            db.id,
            if mapped { " (mapped)" } else { "" }
        );
    }
    Ok(())
}
