//! Notion REST adapter for the task store.
//!
//! Queries a single database for Done tasks and applies resets through
//! the pages endpoint. Uses the `status` property type for both the
//! query filter and the update payload.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::config::StoreConfig;
use crate::error::{EngineError, Result};
use crate::record::{TaskPage, TaskStatus};
use crate::store::TaskStore;

const NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// Notion API client scoped to one database.
#[derive(Clone)]
pub struct NotionStore {
    api_key: String,
    base_url: String,
    database_id: String,
    status_property: String,
    completed_property: String,
    client: reqwest::Client,
}

impl NotionStore {
    /// Build a store client from configuration.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(EngineError::Config("store api key is empty".to_owned()));
        }
        let database_id = database_id_from_url(&config.database_url)?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            database_id,
            status_property: config.status_property.clone(),
            completed_property: config.completed_property.clone(),
            client: reqwest::Client::new(),
        })
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Database id this client is scoped to.
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn query_batch(&self, cursor: Option<&str>) -> Result<Value> {
        let url = format!(
            "{}/v1/databases/{}/query",
            self.base_url, self.database_id
        );
        let mut body = json!({
            "filter": {
                "property": self.status_property,
                "status": {"equals": TaskStatus::Done.as_store_name()}
            }
        });
        if let (Some(cursor), Some(obj)) = (cursor, body.as_object_mut()) {
            obj.insert("start_cursor".to_owned(), json!(cursor));
        }

        let response = self
            .authed(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Store(format!("query request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Store(format!("query rejected ({status}): {text}")));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::Store(format!("cannot parse query response: {e}")))
    }
}

#[async_trait]
impl TaskStore for NotionStore {
    async fn query_done(&self) -> Result<Vec<TaskPage>> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = self.query_batch(cursor.as_deref()).await?;
            let results = body
                .get("results")
                .and_then(Value::as_array)
                .ok_or_else(|| EngineError::Store("query response missing 'results'".to_owned()))?;

            for entry in results {
                let id = entry
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| EngineError::Store("query result missing 'id'".to_owned()))?;
                let properties = entry.get("properties").cloned().unwrap_or(Value::Null);
                pages.push(TaskPage::new(id, properties));
            }

            let has_more = body.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            cursor = body
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_owned);
            if !has_more || cursor.is_none() {
                break;
            }
        }

        Ok(pages)
    }

    async fn apply_reset(&self, page_id: &str, today: NaiveDate) -> Result<()> {
        let mut properties = serde_json::Map::new();
        properties.insert(
            self.status_property.clone(),
            json!({"status": {"name": TaskStatus::NotStarted.as_store_name()}}),
        );
        properties.insert(
            self.completed_property.clone(),
            json!({"date": {"start": today.format("%Y-%m-%d").to_string()}}),
        );
        let body = json!({"properties": properties});

        let url = format!("{}/v1/pages/{page_id}", self.base_url);
        let response = self
            .authed(self.client.patch(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Transition {
                page_id: page_id.to_owned(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Transition {
                page_id: page_id.to_owned(),
                reason: format!("update rejected ({status}): {text}"),
            });
        }

        Ok(())
    }
}

/// Extract the database id from a shared database URL: the last
/// non-empty path segment with hyphens stripped.
pub fn database_id_from_url(database_url: &str) -> Result<String> {
    let parsed = url::Url::parse(database_url)
        .map_err(|e| EngineError::Config(format!("invalid database URL '{database_url}': {e}")))?;

    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();

    let id: String = segment.chars().filter(|c| *c != '-').collect();
    if id.is_empty() {
        return Err(EngineError::Config(format!(
            "database URL '{database_url}' has no id segment"
        )));
    }
    Ok(id)
}
