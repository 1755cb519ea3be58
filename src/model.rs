use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card pulled off the board, in the shape it is saved to disk and imported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Name of the list the card lived in; selects the destination database.
    pub list_name: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    /// Set when the listing reports comments or attachments that the bulk
    /// call does not inline.
    #[serde(default)]
    pub needs_enrichment: bool,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// `true` for an uploaded file, `false` for an external link.
    pub is_upload: bool,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, list_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            list_name: list_name.into(),
            labels: Vec::new(),
            last_modified: None,
            needs_enrichment: false,
            comments: Vec::new(),
            attachments: Vec::new(),
        }
    }
}
