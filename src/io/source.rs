use std::path::PathBuf;
use std::time::Duration;
use async_trait::async_trait;
use tracing::info;

use crate::models::{Catalog, Result};
use super::catalog::parse_catalog_str;

/// Somewhere the catalog text can be fetched from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable location, for logs and error messages.
    fn describe(&self) -> String;

    /// Fetch the raw CSV text.
    async fn fetch(&self) -> Result<String>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Picks an HTTP source for `http(s)://` locations and a file source
/// otherwise.
pub fn open_source(location: &str, timeout: Duration) -> Result<Box<dyn CatalogSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

pub async fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog> {
    info!("Loading catalog from {}", source.describe());
    let text = source.fetch().await?;
    parse_catalog_str(&text)
}
