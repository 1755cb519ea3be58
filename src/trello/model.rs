use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{Attachment, Item, Label};

/// Action type Trello uses for a comment left on a card.
pub const COMMENT_ACTION: &str = "commentCard";

/// Color given to labels that have none in Trello.
pub const NO_COLOR: &str = "default";

#[derive(Deserialize, Debug, Default)]
pub struct SearchBoardsResp {
    #[serde(default)]
    pub boards: Vec<BoardRef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BoardRef {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrelloList {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrelloCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "dateLastActivity", default)]
    pub date_last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<TrelloLabel>,
    #[serde(default)]
    pub badges: Badges,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrelloLabel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Badges {
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub attachments: u32,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TrelloFullCard {
    pub id: String,
    #[serde(default)]
    pub actions: Vec<TrelloAction>,
    #[serde(default)]
    pub attachments: Vec<TrelloAttachment>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrelloAction {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: ActionData,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ActionData {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrelloAttachment {
    #[serde(rename = "isUpload", default)]
    pub is_upload: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,
}

impl TrelloCard {
    pub fn needs_enrichment(&self) -> bool {
        self.badges.comments > 0 || self.badges.attachments > 0
    }

    pub fn into_item(self, list_name: &str) -> Item {
        let needs_enrichment = self.needs_enrichment();
        Item {
            id: self.id,
            name: self.name,
            description: self.desc,
            list_name: list_name.to_string(),
            labels: self
                .labels
                .into_iter()
                .map(|l| Label {
                    name: l.name,
                    color: l.color.unwrap_or_else(|| NO_COLOR.to_string()),
                })
                .collect(),
            last_modified: self.date_last_activity,
            needs_enrichment,
            comments: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

impl TrelloFullCard {
    /// Comment texts, oldest first. Trello lists actions newest first;
    /// actions without a date keep their relative position.
    pub fn comments(&self) -> Vec<String> {
        let mut comments: Vec<&TrelloAction> = self
            .actions
            .iter()
            .filter(|a| a.typ == COMMENT_ACTION)
            .collect();
        comments.sort_by_key(|a| a.date);
        comments
            .into_iter()
            .filter_map(|a| a.data.text.clone())
            .collect()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments
            .iter()
            .map(|a| Attachment {
                is_upload: a.is_upload,
                name: a.name.clone(),
                url: a.url.clone(),
                file_name: a.file_name.clone(),
            })
            .collect()
    }
}
