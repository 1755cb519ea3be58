use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;

use crate::notion::model::{CreatePageResponse, DatabaseSummary, SearchResp};

pub mod model;
pub mod page;

const NOTION_API_BASE: &str = "https://api.notion.com/";

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait NotionService: Send + Sync {
    /// Every database shared with the integration.
    async fn search_databases(&self) -> Result<Vec<DatabaseSummary>>;

    /// Add or update property definitions on a database.
    async fn update_database(&self, database_id: &str, properties: &Value) -> Result<()>;

    /// Create a page from a full request body; returns the new page id.
    async fn create_page(&self, body: &Value) -> Result<String>;
}

impl NotionClient {
    pub fn new(token: String, version: String) -> Self {
        let base_url = Url::parse(NOTION_API_BASE).expect("valid default Notion URL");
        Self::with_base_url(token, version, base_url)
    }

    pub fn with_base_url(token: String, version: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("baleen/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
            version,
        }
    }

    pub fn build_request(&self, method: Method, path: &str, body: &Value) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(path)
            .context("invalid Notion base URL")?;
        self.http
            .request(method, endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
            .header("Content-Type", "application/json")
            .json(body)
            .build()
            .context("failed to build Notion request")
    }

    async fn execute(&self, method: Method, path: &str, body: &Value) -> Result<reqwest::Response> {
        let request = self.build_request(method, path, body)?;
        debug!(url = %request.url(), method = %request.method(), "sending notion request");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Notion")?;

        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("received 429 from Notion: {}", body));
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("notion error {}: {}", status, body));
        }
        Ok(res)
    }

    pub async fn search_databases(&self) -> Result<Vec<DatabaseSummary>> {
        let mut databases = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut body = json!({
                "filter": { "value": "database", "property": "object" },
                "page_size": 100,
            });
            if let Some(c) = &cursor {
                body["start_cursor"] = json!(c);
            }
            let res = self.execute(Method::POST, "v1/search", &body).await?;
            let page: SearchResp = res.json().await.context("invalid Notion search response")?;
            databases.extend(page.results.into_iter().map(DatabaseSummary::from));
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        Ok(databases)
    }

    pub async fn update_database(&self, database_id: &str, properties: &Value) -> Result<()> {
        let body = json!({ "properties": properties });
        self.execute(Method::PATCH, &format!("v1/databases/{}", database_id), &body)
            .await?;
        Ok(())
    }

    pub async fn create_page(&self, body: &Value) -> Result<String> {
        let res = self.execute(Method::POST, "v1/pages", body).await?;
        let payload: CreatePageResponse = res.json().await.context("invalid Notion response")?;
        Ok(payload.id)
    }
}

#[async_trait]
impl NotionService for NotionClient {
    async fn search_databases(&self) -> Result<Vec<DatabaseSummary>> {
        NotionClient::search_databases(self).await
    }

    async fn update_database(&self, database_id: &str, properties: &Value) -> Result<()> {
        NotionClient::update_database(self, database_id, properties).await
    }

    async fn create_page(&self, body: &Value) -> Result<String> {
        NotionClient::create_page(self, body).await
    }
}
