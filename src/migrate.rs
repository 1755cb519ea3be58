//! End-to-end flows offered by the CLI.
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{MigrationError, Result};
use crate::extract::extract_board;
use crate::import::{ImportSummary, Importer};
use crate::model::Item;
use crate::notion::NotionService;
use crate::save;
use crate::trello::TrelloService;

pub struct Migration<'a> {
    cfg: &'a Config,
    trello: &'a dyn TrelloService,
    notion: &'a dyn NotionService,
}

impl<'a> Migration<'a> {
    pub fn new(cfg: &'a Config, trello: &'a dyn TrelloService, notion: &'a dyn NotionService) -> Self {
        Self { cfg, trello, notion }
    }

    /// Extract `board` and import it, optionally keeping a save of the export.
    #[instrument(skip(self))]
    pub async fn migrate(&self, board: &str, keep_save: bool) -> Result<ImportSummary> {
        let items = extract_board(self.trello, board, self.cfg.enrich_options()).await?;
        if keep_save {
            save::save_items(&self.cfg.data_dir(), save::EXPORTS_DIR, &items).await?;
        }
        self.import(items).await
    }

    /// Extract `board` into a save file without touching Notion.
    #[instrument(skip(self))]
    pub async fn export(&self, board: &str) -> Result<PathBuf> {
        let items = extract_board(self.trello, board, self.cfg.enrich_options()).await?;
        save::save_items(&self.cfg.data_dir(), save::EXPORTS_DIR, &items).await
    }

    /// Import the cards of an earlier export or error save.
    #[instrument(skip(self))]
    pub async fn import_from_save(&self, path: &Path) -> Result<ImportSummary> {
        let items = save::load_items(path).await?;
        let special = items.iter().filter(|i| i.needs_enrichment).count();
        info!(
            special,
            normal = items.len() - special,
            total = items.len(),
            "loaded cards"
        );
        self.import(items).await
    }

    /// Archive every card in the open lists of `board`. Returns the number of
    /// lists cleared.
    #[instrument(skip(self))]
    pub async fn archive(&self, board: &str) -> Result<usize> {
        let board_id = self
            .trello
            .find_board_id(board)
            .await
            .map_err(MigrationError::Extraction)?
            .ok_or_else(|| MigrationError::BoardNotFound(board.to_string()))?;
        let lists = self
            .trello
            .open_lists(&board_id)
            .await
            .map_err(MigrationError::Extraction)?;
        for list in &lists {
            self.trello
                .archive_list_cards(&list.id)
                .await
                .map_err(|err| MigrationError::Extraction(err.context(format!("list '{}'", list.name))))?;
            info!(list = %list.name, "archived cards");
        }
        Ok(lists.len())
    }

    async fn import(&self, items: Vec<Item>) -> Result<ImportSummary> {
        info!(cards = items.len(), "importing cards into Notion");
        Importer::new(self.notion, &self.cfg.notion, self.cfg.import_options())
            .run(items, &self.cfg.data_dir())
            .await
    }
}
