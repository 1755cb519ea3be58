use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use crate::trello::model::{SearchBoardsResp, TrelloCard, TrelloFullCard, TrelloList};

pub mod model;

const TRELLO_API_BASE: &str = "https://api.trello.com/1/";

#[derive(Clone)]
pub struct TrelloClient {
    http: Client,
    base_url: Url,
    key: String,
    token: String,
}

impl fmt::Debug for TrelloClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrelloClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Read side of the board service, plus the bulk archive used after a
/// migration.
#[async_trait]
pub trait TrelloService: Send + Sync {
    /// Id of the board named `name`, or `None` when the search finds nothing.
    async fn find_board_id(&self, name: &str) -> Result<Option<String>>;

    async fn open_lists(&self, board_id: &str) -> Result<Vec<TrelloList>>;

    async fn list_cards(&self, list_id: &str) -> Result<Vec<TrelloCard>>;

    /// Card with its comment actions and attachments inlined.
    async fn full_card(&self, card_id: &str) -> Result<TrelloFullCard>;

    async fn archive_list_cards(&self, list_id: &str) -> Result<()>;
}

impl TrelloClient {
    pub fn new(key: String, token: String) -> Self {
        let base_url = Url::parse(TRELLO_API_BASE).expect("valid default Trello URL");
        Self::with_base_url(key, token, base_url)
    }

    pub fn with_base_url(key: String, token: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("baleen/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            key,
            token,
        }
    }

    /// Build a request against `path` carrying the key/token pair and `params`
    /// as query parameters.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(path)
            .context("invalid Trello base URL")?;
        self.http
            .request(method, endpoint)
            .query(&[("key", self.key.as_str()), ("token", self.token.as_str())])
            .query(params)
            .build()
            .context("failed to build Trello request")
    }

    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        // Path only: the query string carries credentials.
        debug!(path = %request.url().path(), method = %request.method(), "sending trello request");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Trello")?;

        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("received 429 from Trello: {}", body));
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("trello error {}: {}", status, body));
        }
        Ok(res)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let request = self.build_request(Method::GET, path, params)?;
        let res = self.execute(request).await?;
        res.json::<T>()
            .await
            .with_context(|| format!("invalid Trello response for {}", path))
    }

    pub async fn find_board_id(&self, name: &str) -> Result<Option<String>> {
        let resp: SearchBoardsResp = self
            .get_json("search", &[("query", name), ("modelTypes", "boards")])
            .await?;
        let exact = resp.boards.iter().find(|b| b.name == name);
        Ok(exact.or(resp.boards.first()).map(|b| b.id.clone()))
    }

    pub async fn open_lists(&self, board_id: &str) -> Result<Vec<TrelloList>> {
        self.get_json(&format!("boards/{}/lists", board_id), &[("filter", "open")])
            .await
    }

    pub async fn list_cards(&self, list_id: &str) -> Result<Vec<TrelloCard>> {
        self.get_json(&format!("lists/{}/cards", list_id), &[]).await
    }

    pub async fn full_card(&self, card_id: &str) -> Result<TrelloFullCard> {
        self.get_json(
            &format!("cards/{}", card_id),
            &[
                ("actions", model::COMMENT_ACTION),
                ("attachments", "true"),
                ("fields", "name"),
                ("attachment_fields", "all"),
            ],
        )
        .await
    }

    pub async fn archive_list_cards(&self, list_id: &str) -> Result<()> {
        let request =
            self.build_request(Method::POST, &format!("lists/{}/archiveAllCards", list_id), &[])?;
        self.execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl TrelloService for TrelloClient {
    async fn find_board_id(&self, name: &str) -> Result<Option<String>> {
        TrelloClient::find_board_id(self, name).await
    }

    async fn open_lists(&self, board_id: &str) -> Result<Vec<TrelloList>> {
        TrelloClient::open_lists(self, board_id).await
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<TrelloCard>> {
        TrelloClient::list_cards(self, list_id).await
    }

    async fn full_card(&self, card_id: &str) -> Result<TrelloFullCard> {
        TrelloClient::full_card(self, card_id).await
    }

    async fn archive_list_cards(&self, list_id: &str) -> Result<()> {
        TrelloClient::archive_list_cards(self, list_id).await
    }
}
