//! In-memory `package.json` of the target project
//!
//! Hooks declare dependencies and scripts here while tasks are collected.
//! Declarations are idempotent: declaring the same dependency twice leaves a
//! single entry. Dependencies declared without a version are resolved to the
//! latest published version when the manifest is installed.

pub mod package_manager;

pub use package_manager::PackageManager;

use crate::context::Context as GenContext;
use crate::registry::PackageIndex;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Version written when the registry cannot be reached
pub const FALLBACK_VERSION: &str = "latest";

/// Serialized form of `package.json`. Unknown fields are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Which dependency table an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DependencyKind {
    Runtime,
    Dev,
}

#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    data: PackageJson,
    unresolved: BTreeSet<(DependencyKind, String)>,
    dirty: bool,
}

impl PackageManifest {
    /// Empty manifest that will be written to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: PackageJson::default(),
            unresolved: BTreeSet::new(),
            dirty: false,
        }
    }

    /// Load `path` if it exists, otherwise start empty
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self::new(path));
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data: PackageJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Self {
            path,
            data,
            unresolved: BTreeSet::new(),
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &PackageJson {
        &self.data
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.data.name = Some(name.into());
        self.dirty = true;
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.data.version = Some(version.into());
        self.dirty = true;
    }

    /// Declare a runtime dependency. `None` means "latest", resolved at install time;
    /// it never downgrades an entry that already has a version.
    pub fn add_dependency(&mut self, name: impl Into<String>, version: Option<&str>) {
        self.add(DependencyKind::Runtime, name.into(), version);
    }

    pub fn add_dev_dependency(&mut self, name: impl Into<String>, version: Option<&str>) {
        self.add(DependencyKind::Dev, name.into(), version);
    }

    /// Declare several runtime dependencies. Versions may reference context
    /// values (`{{coreVersion}}`); an empty version means latest.
    pub fn add_dependencies<I, K, V>(&mut self, deps: I, ctx: &GenContext)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (name, version) in deps {
            let version = ctx.interpolate(version.as_ref());
            let version = version.trim();
            self.add(
                DependencyKind::Runtime,
                name.into(),
                (!version.is_empty()).then_some(version),
            );
        }
    }

    pub fn add_dev_dependencies<I, K, V>(&mut self, deps: I, ctx: &GenContext)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (name, version) in deps {
            let version = ctx.interpolate(version.as_ref());
            let version = version.trim();
            self.add(
                DependencyKind::Dev,
                name.into(),
                (!version.is_empty()).then_some(version),
            );
        }
    }

    pub fn add_scripts<I, K, V>(&mut self, scripts: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, command) in scripts {
            let command: String = command.into();
            if self.data.scripts.insert(name.into(), command.clone()) != Some(command) {
                self.dirty = true;
            }
        }
    }

    fn add(&mut self, kind: DependencyKind, name: String, version: Option<&str>) {
        let table = match kind {
            DependencyKind::Runtime => &mut self.data.dependencies,
            DependencyKind::Dev => &mut self.data.dev_dependencies,
        };

        match version {
            Some(version) => {
                if table.get(&name).map(String::as_str) != Some(version) {
                    table.insert(name.clone(), version.to_string());
                    self.dirty = true;
                }
                self.unresolved.remove(&(kind, name));
            }
            None if table.contains_key(&name) => {}
            None => {
                table.insert(name.clone(), FALLBACK_VERSION.to_string());
                self.unresolved.insert((kind, name));
                self.dirty = true;
            }
        }
    }

    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.data.dependencies
    }

    pub fn dev_dependencies(&self) -> &BTreeMap<String, String> {
        &self.data.dev_dependencies
    }

    pub fn scripts(&self) -> &BTreeMap<String, String> {
        &self.data.scripts
    }

    /// Whether anything changed since the manifest was loaded or last saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dependencies still waiting for a version lookup
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.unresolved.iter().map(|(_, name)| name.as_str())
    }

    /// Replace "latest" placeholders with `^<latest version>` from `index`.
    /// Lookup failures keep the placeholder.
    pub async fn resolve_versions(&mut self, index: &dyn PackageIndex) {
        let pending = std::mem::take(&mut self.unresolved);
        if !pending.is_empty() {
            self.dirty = true;
        }

        for (kind, name) in pending {
            let version = match index.info(&name).await {
                Ok(info) => match crate::version::parse_version(&info.version) {
                    Ok(version) => format!("^{}", version),
                    Err(e) => {
                        tracing::warn!(package = %name, error = %e, "unusable version from registry");
                        FALLBACK_VERSION.to_string()
                    }
                },
                Err(e) => {
                    tracing::warn!(package = %name, error = %e, "version lookup failed");
                    FALLBACK_VERSION.to_string()
                }
            };

            let table = match kind {
                DependencyKind::Runtime => &mut self.data.dependencies,
                DependencyKind::Dev => &mut self.data.dev_dependencies,
            };
            table.insert(name, version);
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize package.json")?;
        json.push('\n');
        Ok(json)
    }

    /// Write the manifest, creating the parent directory if needed
    pub async fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&self.path, self.to_json_string()?)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }
}
