//! Template directory manifest
//!
//! A template directory may carry a `templates.yaml` mapping template ids to
//! files. Without one, every `*.hbs` file is a template whose id is its path
//! relative to the directory, minus the extension.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MANIFEST_FILE: &str = "templates.yaml";
pub const TEMPLATE_EXTENSION: &str = "hbs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// File path relative to the template directory
    pub file: String,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateManifest {
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateEntry>,
}

impl TemplateManifest {
    /// Read `templates.yaml` from `dir`, or discover templates when it is absent
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path)
                .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
            return serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", manifest_path.display()));
        }
        Ok(Self::discover(dir))
    }

    /// Every `*.hbs` file under `dir`, skipping hidden directories
    pub fn discover(dir: &Path) -> Self {
        let mut templates = BTreeMap::new();

        for entry in WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e
                        .file_name()
                        .to_str()
                        .is_some_and(|name| name.starts_with('.'))
            })
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };

            let file = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let id = file
                .strip_suffix(&format!(".{}", TEMPLATE_EXTENSION))
                .unwrap_or(&file)
                .to_string();

            templates.insert(
                id,
                TemplateEntry {
                    file,
                    description: None,
                },
            );
        }

        Self { templates }
    }

    /// Absolute path of the template registered as `id`
    pub fn resolve(&self, dir: &Path, id: &str) -> Option<PathBuf> {
        self.templates.get(id).map(|entry| dir.join(&entry.file))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}
