use crate::{
    config::Markets as MarketsConfig,
    metrics::external::{self, Target},
};
use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::{collections::HashSet, path::Path};

/// Set of market ids known to the platform
#[derive(Debug, Clone, Default)]
pub struct MarketCatalog {
    markets: HashSet<String>,
}

/// A catalog entry is either a bare id or an object carrying one
#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Id(String),
    Market { id: String },
}

impl From<Entry> for String {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Id(id) | Entry::Market { id } => id,
        }
    }
}

impl MarketCatalog {
    pub fn contains(&self, id: &str) -> bool {
        self.markets.contains(id)
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Load the catalog from whichever source is configured
    pub async fn load(config: &MarketsConfig) -> Result<Self> {
        match config {
            MarketsConfig::File(path) => Self::from_file(path),
            MarketsConfig::Url(url) => Self::fetch(&Client::new(), url).await,
        }
    }

    /// Load the catalog from a JSON or YAML list on disk
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading market catalog from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let entries: Vec<Entry> = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_norway::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(entries.into_iter().map(String::from).collect())
    }

    /// Fetch the catalog from the platform
    #[tracing::instrument(skip(client))]
    pub async fn fetch(client: &Client, url: &str) -> Result<Self> {
        tracing::info!("Fetching market catalog");
        let _timer = external::external_request_timer(Target::Markets);

        let resp = match client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                external::record_external_request_failure(Target::Markets);
                return Err(e.into());
            }
        };

        if !resp.status().is_success() {
            external::record_external_request_failure(Target::Markets);

            return Err(anyhow::anyhow!(
                "Failed to fetch market catalog: HTTP {}",
                resp.status()
            ));
        }

        let entries = resp.json::<Vec<Entry>>().await?;

        Ok(entries.into_iter().map(String::from).collect())
    }
}

impl FromIterator<String> for MarketCatalog {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            markets: iter.into_iter().collect(),
        }
    }
}
