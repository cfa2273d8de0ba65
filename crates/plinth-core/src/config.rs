//! Per-project configuration (`.plinthrc.yaml`)
//!
//! Every field is optional. Values from the file are overridden by the
//! product's environment variables, which are in turn overridden by CLI flags
//! applied by the binary.

use crate::error::CoreError;
use crate::manifest::PackageManager;
use crate::product::ProductConfig;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory generated sources are written under, relative to the root
    pub source_dir: PathBuf,

    /// Directory searched for template overrides before the built-ins
    pub template_dir: Option<PathBuf>,

    /// Forced package manager; detected when absent
    pub package_manager: Option<PackageManager>,

    pub registry_url: Option<String>,

    /// Oldest CLI version this project works with
    pub min_cli_version: Option<String>,

    /// Features enabled when `init` runs non-interactively
    pub features: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            template_dir: None,
            package_manager: None,
            registry_url: None,
            min_cli_version: None,
            features: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Load `<root>/<config file>` if present and apply environment overrides
    pub fn load<C: ProductConfig>(product: &C, root: &Path) -> Result<Self, CoreError> {
        let path = root.join(product.config_file_name());
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_yaml_str(&content).map_err(|source| CoreError::Config {
                path: path.clone(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env(product, |key| std::env::var(key).ok())?;
        tracing::debug!(config = ?config, "project configuration loaded");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse project configuration")
    }

    /// Apply the product's environment overrides, reading variables through `lookup`
    pub fn apply_env<C, F>(&mut self, product: &C, lookup: F) -> Result<(), CoreError>
    where
        C: ProductConfig,
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(product.registry_url_env()) {
            self.registry_url = Some(url);
        }
        if let Some(pm) = lookup(product.package_manager_env()) {
            let parsed = pm.parse::<PackageManager>().map_err(|source| CoreError::Config {
                path: PathBuf::from(product.package_manager_env()),
                source,
            })?;
            self.package_manager = Some(parsed);
        }
        Ok(())
    }

    /// Configured registry, else the product default
    pub fn registry_url<C: ProductConfig>(&self, product: &C) -> Result<Url, CoreError> {
        let raw = self
            .registry_url
            .as_deref()
            .unwrap_or(product.default_registry_url());
        Url::parse(raw)
            .with_context(|| format!("Invalid registry URL: {}", raw))
            .map_err(CoreError::Registry)
    }

    /// Configured package manager, else the one detected for `root`
    pub fn package_manager(&self, root: &Path) -> PackageManager {
        self.package_manager
            .unwrap_or_else(|| PackageManager::detect(root))
    }

    /// Template directory resolved against `root`
    pub fn template_dir(&self, root: &Path) -> Option<PathBuf> {
        self.template_dir.as_ref().map(|dir| root.join(dir))
    }
}
