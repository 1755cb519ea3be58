//! Pushes cards into Notion.
//!
//! Preparation runs once: database titles are resolved to ids and every
//! target database gets the Description / Primary Link / Labels / Last
//! Updated properties. Cards are then written `chunk_size` at a time; a chunk
//! must finish completely before the next one starts. Each card is retried
//! with a fixed backoff and, once out of attempts, quarantined instead of
//! failing the run.
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::chunk::chunk;
use crate::config;
use crate::error::{MigrationError, Result};
use crate::model::Item;
use crate::notion::page::{build_page_request, collect_label_options, schema_properties};
use crate::notion::NotionService;
use crate::save;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub chunk_size: usize,
    /// Create attempts per card, the first one included.
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub description_limit: Option<usize>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            max_attempts: 4,
            retry_backoff: Duration::from_secs(2),
            description_limit: Some(100),
        }
    }
}

/// Where each Trello list's cards go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    /// Database title -> database id.
    pub databases: BTreeMap<String, String>,
    /// List name -> database id.
    pub lists: BTreeMap<String, String>,
}

impl Targets {
    pub fn database_for(&self, list_name: &str) -> Option<&str> {
        self.lists.get(list_name).map(String::as_str)
    }
}

/// Outcome of the write loop.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: usize,
    /// Cards that were never created, in the order they were given up on.
    pub failed: Vec<Item>,
}

/// What a finished import leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub quarantined: usize,
    /// Save file holding the quarantined cards, when there are any.
    pub failure_file: Option<PathBuf>,
}

enum Outcome {
    Created,
    Quarantined(Item),
}

pub struct Importer<'a> {
    notion: &'a dyn NotionService,
    mapping: &'a config::Notion,
    opts: ImportOptions,
}

impl<'a> Importer<'a> {
    pub fn new(notion: &'a dyn NotionService, mapping: &'a config::Notion, opts: ImportOptions) -> Self {
        Self {
            notion,
            mapping,
            opts,
        }
    }

    /// Prepare the databases, import `items` and save any quarantined cards
    /// under `data_dir`.
    pub async fn run(&self, items: Vec<Item>, data_dir: &Path) -> Result<ImportSummary> {
        let targets = self.prepare(&items).await?;
        let report = self.import_items(&targets, items).await;

        let failure_file = if report.failed.is_empty() {
            None
        } else {
            let path = save::save_items(data_dir, save::ERRORS_DIR, &report.failed).await?;
            warn!(
                quarantined = report.failed.len(),
                path = %path.display(),
                "some cards could not be imported; saved for inspection"
            );
            Some(path)
        };

        Ok(ImportSummary {
            created: report.created,
            quarantined: report.failed.len(),
            failure_file,
        })
    }

    /// Resolve the configured database titles and push the property schema
    /// to each of them.
    #[instrument(skip_all)]
    pub async fn prepare(&self, items: &[Item]) -> Result<Targets> {
        let targets = self.resolve_targets().await?;

        let labels = collect_label_options(items, &self.mapping.colors);
        let properties = schema_properties(&labels);
        info!(labels = labels.len(), "adding properties to databases");
        for (title, id) in &targets.databases {
            self.notion
                .update_database(id, &properties)
                .await
                .map_err(|cause| MigrationError::Schema {
                    database: title.clone(),
                    cause,
                })?;
            debug!(database = %title, "database properties updated");
        }

        Ok(targets)
    }

    pub async fn resolve_targets(&self) -> Result<Targets> {
        let wanted: BTreeSet<&str> = self.mapping.databases.values().map(String::as_str).collect();
        let found = self
            .notion
            .search_databases()
            .await
            .map_err(MigrationError::DatabaseSearch)?;

        let mut databases = BTreeMap::new();
        for db in found {
            if wanted.contains(db.title.as_str()) {
                databases.entry(db.title).or_insert(db.id);
            }
        }
        if let Some(missing) = wanted.iter().find(|t| !databases.contains_key(**t)) {
            return Err(MigrationError::DatabaseNotFound(missing.to_string()));
        }

        let lists = self
            .mapping
            .databases
            .iter()
            .map(|(list, title)| (list.clone(), databases[title].clone()))
            .collect();
        Ok(Targets { databases, lists })
    }

    /// Write every card, at most `chunk_size` in flight.
    #[instrument(skip_all, fields(cards = items.len()))]
    pub async fn import_items(&self, targets: &Targets, items: Vec<Item>) -> ImportReport {
        let mut report = ImportReport::default();
        let chunks = chunk(items, self.opts.chunk_size);
        let total = chunks.len();

        for (i, current) in chunks.into_iter().enumerate() {
            let tasks = current
                .into_iter()
                .map(|item| self.import_item(targets, item));
            for outcome in join_all(tasks).await {
                match outcome {
                    Outcome::Created => report.created += 1,
                    Outcome::Quarantined(item) => report.failed.push(item),
                }
            }
            if (i + 1) % 15 == 0 {
                info!(chunk = i + 1, total, "import progress");
            }
        }

        info!(
            created = report.created,
            quarantined = report.failed.len(),
            "imported all cards"
        );
        report
    }

    async fn import_item(&self, targets: &Targets, item: Item) -> Outcome {
        let Some(database_id) = targets.database_for(&item.list_name) else {
            warn!(card = %item.name, list = %item.list_name, "no Notion database mapped for list");
            return Outcome::Quarantined(item);
        };
        let body = build_page_request(database_id, &item, self.opts.description_limit);

        let mut attempt = 1;
        loop {
            match self.notion.create_page(&body).await {
                Ok(page_id) => {
                    debug!(card = %item.name, page_id = %page_id, "added card");
                    return Outcome::Created;
                }
                Err(err) if attempt < self.opts.max_attempts => {
                    warn!(?err, card = %item.name, attempt, "failed to add card; retrying");
                    tokio::time::sleep(self.opts.retry_backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(?err, card = %item.name, attempt, "unable to add card; quarantining");
                    return Outcome::Quarantined(item);
                }
            }
        }
    }
}
