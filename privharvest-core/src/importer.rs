use crate::error::{CoreError, Result};
use crate::model::Snapshot;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};
use url::Url;

pub const STORE_URL_ENV: &str = "VITE_SUPABASE_URL";
pub const STORE_KEY_ENV: &str = "VITE_SUPABASE_ANON_KEY";

pub const CATEGORY_TABLE: &str = "tool_categories";
pub const TOOL_TABLE: &str = "privacy_tools";

/// Static credentials for the hosted store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

impl StoreConfig {
    pub fn new(url: Option<String>, key: Option<String>) -> Result<Self> {
        let url = url
            .filter(|u| !u.trim().is_empty())
            .ok_or(CoreError::MissingCredential(STORE_URL_ENV))?;
        let key = key
            .filter(|k| !k.trim().is_empty())
            .ok_or(CoreError::MissingCredential(STORE_KEY_ENV))?;
        Ok(Self { url, key })
    }
}

#[derive(Serialize)]
struct CategoryRow<'a> {
    name: &'a str,
    description: &'a str,
    slug: &'a str,
    icon: Option<&'a str>,
}

#[derive(Serialize)]
struct ToolRow<'a> {
    category_id: &'a Value,
    name: &'a str,
    description: &'a str,
    url: &'a str,
    github_url: Option<&'a str>,
    license: Option<&'a str>,
    is_open_source: bool,
    is_free: bool,
    has_paid_plan: bool,
    platforms: &'a [String],
    tags: &'a BTreeSet<String>,
}

#[derive(Deserialize)]
struct CategoryIdRow {
    id: Value,
    slug: String,
}

/// Thin client over the store's REST row API.
pub struct StoreClient {
    client: Client,
    rest_base: Url,
    key: String,
}

impl StoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut base = config.url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let rest_base = Url::parse(&base)
            .and_then(|u| u.join("rest/v1/"))
            .map_err(|e| CoreError::InvalidStoreUrl {
                url: config.url.clone(),
                reason: e.to_string(),
            })?;

        let client = Client::builder()
            .user_agent(privharvest_scanner::fetch::USER_AGENT)
            .build()
            .map_err(|source| CoreError::StoreRequest {
                table: "client setup".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            rest_base,
            key: config.key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.rest_base
            .join(table)
            .map_err(|e| CoreError::InvalidStoreUrl {
                url: self.rest_base.to_string(),
                reason: e.to_string(),
            })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    pub async fn insert<T: Serialize>(&self, table: &str, row: &T) -> Result<()> {
        let url = self.table_url(table)?;
        debug!("POST {}", url);

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|source| CoreError::StoreRequest {
                table: table.to_string(),
                source,
            })?;

        check_status(table, response).await.map(|_| ())
    }

    /// slug -> generated id for every category the store knows about.
    pub async fn category_ids(&self) -> Result<HashMap<String, Value>> {
        let mut url = self.table_url(CATEGORY_TABLE)?;
        url.query_pairs_mut().append_pair("select", "id,slug");
        debug!("GET {}", url);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|source| CoreError::StoreRequest {
                table: CATEGORY_TABLE.to_string(),
                source,
            })?;

        let response = check_status(CATEGORY_TABLE, response).await?;
        let rows: Vec<CategoryIdRow> =
            response
                .json()
                .await
                .map_err(|source| CoreError::StoreRequest {
                    table: CATEGORY_TABLE.to_string(),
                    source,
                })?;

        Ok(rows.into_iter().map(|r| (r.slug, r.id)).collect())
    }
}

async fn check_status(table: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CoreError::StoreStatus {
        table: table.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories_inserted: usize,
    pub categories_failed: usize,
    pub tools_inserted: usize,
    pub tools_failed: usize,
    pub tools_skipped: usize,
}

/// Insert categories, look their ids up, then insert tools against those ids.
/// Individual rows that fail are logged and counted; only the id lookup is
/// fatal.
pub async fn import_snapshot(client: &StoreClient, snapshot: &Snapshot) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    info!("Importing {} categories", snapshot.category_count());
    for (slug, category) in snapshot.categories() {
        let row = CategoryRow {
            name: &category.name,
            description: &category.description,
            slug,
            icon: None,
        };
        match client.insert(CATEGORY_TABLE, &row).await {
            Ok(()) => summary.categories_inserted += 1,
            Err(e) => {
                warn!("Error importing category {}: {}", category.name, e);
                summary.categories_failed += 1;
            }
        }
    }

    let category_ids = client.category_ids().await?;
    debug!("Resolved {} category ids", category_ids.len());

    info!("Importing {} tools", snapshot.tool_count());
    for tool in snapshot.tools() {
        let Some(category_id) = category_ids.get(&tool.category_slug) else {
            warn!(
                "No category '{}' found for tool {}",
                tool.category_slug, tool.name
            );
            summary.tools_skipped += 1;
            continue;
        };

        let row = ToolRow {
            category_id,
            name: &tool.name,
            description: &tool.description,
            url: &tool.url,
            github_url: tool.github_url.as_deref(),
            license: tool.license.as_deref(),
            is_open_source: tool.is_open_source,
            is_free: tool.is_free,
            has_paid_plan: tool.has_paid_plan,
            platforms: &tool.platforms,
            tags: &tool.tags,
        };
        match client.insert(TOOL_TABLE, &row).await {
            Ok(()) => summary.tools_inserted += 1,
            Err(e) => {
                warn!("Error importing tool {}: {}", tool.name, e);
                summary.tools_failed += 1;
            }
        }
    }

    info!(
        "Import finished: {}/{} categories, {}/{} tools",
        summary.categories_inserted,
        snapshot.category_count(),
        summary.tools_inserted,
        snapshot.tool_count()
    );
    Ok(summary)
}
