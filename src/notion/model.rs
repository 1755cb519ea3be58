use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct SearchResp {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SearchResult {
    pub id: String,
    #[serde(default)]
    pub title: Vec<TitleText>,
}

#[derive(Deserialize, Debug)]
pub struct TitleText {
    #[serde(default)]
    pub plain_text: String,
}

/// A database the integration can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub id: String,
    pub title: String,
}

impl From<SearchResult> for DatabaseSummary {
    fn from(result: SearchResult) -> Self {
        let title = result.title.iter().map(|t| t.plain_text.as_str()).collect();
        Self {
            id: result.id,
            title,
        }
    }
}

#[derive(Deserialize)]
pub struct CreatePageResponse {
    pub id: String,
}
