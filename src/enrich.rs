//! Fetches comments and attachments for cards whose listing entry only
//! carries counters.
//!
//! Cards are processed chunk by chunk. Inside a chunk the cards are split
//! across `parallelism` workers that each issue one request per card in
//! sequence, so at most `parallelism` requests are in flight. The next chunk
//! starts only after every worker of the current one has returned.
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::chunk::{chunk, split_into};
use crate::model::Item;
use crate::trello::TrelloService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    pub chunk_size: usize,
    pub parallelism: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            parallelism: 2,
        }
    }
}

/// Returns the enriched cards in input order. A card whose fetch fails keeps empty
/// comments and attachments; the run carries on.
#[instrument(skip_all, fields(cards = items.len()))]
pub async fn enrich_items(
    trello: &dyn TrelloService,
    items: Vec<Item>,
    opts: EnrichOptions,
) -> Vec<Item> {
    let chunks = chunk(items, opts.chunk_size);
    let total = chunks.len();
    let mut enriched = Vec::new();

    for (i, current) in chunks.into_iter().enumerate() {
        let workers = split_into(current, opts.parallelism)
            .into_iter()
            .map(|part| enrich_part(trello, part));
        for part in join_all(workers).await {
            enriched.extend(part);
        }
        info!(chunk = i + 1, total, "enriched special cards");
    }

    enriched
}

async fn enrich_part(trello: &dyn TrelloService, part: Vec<Item>) -> Vec<Item> {
    let mut done = Vec::with_capacity(part.len());
    for mut item in part {
        match trello.full_card(&item.id).await {
            Ok(full) => {
                item.comments.extend(full.comments());
                item.attachments.extend(full.attachments());
            }
            Err(err) => {
                warn!(
                    ?err,
                    card = %item.name,
                    id = %item.id,
                    "failed to fetch card details; keeping card without comments or attachments"
                );
            }
        }
        done.push(item);
    }
    done
}
