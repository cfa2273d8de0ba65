//! Package index client (npm-compatible registry)
//!
//! Two lookups are needed by the engine: keyword search for autocomplete
//! questions and latest-version lookup for dependencies declared without a
//! version.

use crate::context::Context;
use crate::prompt::{Choice, ChoiceSource};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Package metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

impl PackageInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
        }
    }
}

#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Packages matching `keyword`, at most `size` of them
    async fn search(&self, keyword: &str, size: usize) -> Result<Vec<PackageInfo>>;

    /// Latest published metadata for `name`
    async fn info(&self, name: &str) -> Result<PackageInfo>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

#[derive(Debug, Deserialize)]
struct SearchObject {
    package: PackageInfo,
}

/// HTTP client for an npm-compatible registry
pub struct NpmRegistryClient {
    base: Url,
    client: reqwest::Client,
}

impl NpmRegistryClient {
    pub const DEFAULT_URL: &'static str = "https://registry.npmjs.org";

    /// Create a new client with a custom user agent
    pub fn new(base: Url, user_agent: &str) -> Self {
        Self {
            base,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach package registry at {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Registry request {} failed: HTTP {}", url, response.status());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse registry response from {}", url))
    }
}

#[async_trait]
impl PackageIndex for NpmRegistryClient {
    async fn search(&self, keyword: &str, size: usize) -> Result<Vec<PackageInfo>> {
        let mut url = Self::build_url(&self.base, &["-", "v1", "search"])?;
        url.query_pairs_mut()
            .append_pair("text", keyword)
            .append_pair("size", &size.to_string());

        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.objects.into_iter().map(|o| o.package).collect())
    }

    async fn info(&self, name: &str) -> Result<PackageInfo> {
        let url = Self::build_url(&self.base, &[name, "latest"])?;
        self.get_json(url).await
    }
}

/// In-memory index, for offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    packages: Vec<PackageInfo>,
}

impl StaticIndex {
    pub fn new(packages: Vec<PackageInfo>) -> Self {
        Self { packages }
    }
}

#[async_trait]
impl PackageIndex for StaticIndex {
    async fn search(&self, keyword: &str, size: usize) -> Result<Vec<PackageInfo>> {
        let keyword = keyword.to_lowercase();
        Ok(self
            .packages
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&keyword))
            .take(size)
            .cloned()
            .collect())
    }

    async fn info(&self, name: &str) -> Result<PackageInfo> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Package '{}' not found", name))
    }
}

/// Autocomplete source listing the packages that match a search keyword
pub struct PackageSearchSource {
    index: Arc<dyn PackageIndex>,
    keyword: String,
    size: usize,
}

impl PackageSearchSource {
    pub fn new(index: Arc<dyn PackageIndex>, keyword: impl Into<String>, size: usize) -> Self {
        Self {
            index,
            keyword: keyword.into(),
            size,
        }
    }
}

#[async_trait]
impl ChoiceSource for PackageSearchSource {
    async fn fetch(&self, _ctx: &Context) -> Result<Vec<Choice>> {
        let packages = self.index.search(&self.keyword, self.size).await?;
        Ok(packages
            .into_iter()
            .map(|p| Choice::new(p.name.clone(), p.name).hint(p.description))
            .collect())
    }
}
