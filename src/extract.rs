use tracing::{info, instrument};

use crate::enrich::{enrich_items, EnrichOptions};
use crate::error::{MigrationError, Result};
use crate::model::Item;
use crate::trello::TrelloService;

/// Read every card of every open list on `board_name`.
///
/// Cards without comments or attachments come first, followed by the
/// enriched ones; each group keeps list-then-card order. Any failure to find
/// the board or read a list aborts the whole extraction.
#[instrument(skip(trello, opts))]
pub async fn extract_board(
    trello: &dyn TrelloService,
    board_name: &str,
    opts: EnrichOptions,
) -> Result<Vec<Item>> {
    info!("extracting Trello board");

    let board_id = trello
        .find_board_id(board_name)
        .await
        .map_err(MigrationError::Extraction)?
        .ok_or_else(|| MigrationError::BoardNotFound(board_name.to_string()))?;

    let lists = trello
        .open_lists(&board_id)
        .await
        .map_err(MigrationError::Extraction)?;

    let mut normal = Vec::new();
    let mut special = Vec::new();
    for list in &lists {
        info!(list = %list.name, "extracting list");
        let cards = trello
            .list_cards(&list.id)
            .await
            .map_err(|err| MigrationError::Extraction(err.context(format!("list '{}'", list.name))))?;
        for card in cards {
            let item = card.into_item(&list.name);
            if item.needs_enrichment {
                special.push(item);
            } else {
                normal.push(item);
            }
        }
    }

    info!(
        special = special.len(),
        normal = normal.len(),
        "classified cards"
    );

    let special = enrich_items(trello, special, opts).await;
    normal.extend(special);
    Ok(normal)
}
