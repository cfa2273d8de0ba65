//! Filesystem template renderer

use super::manifest::TemplateManifest;
use super::{RenderOptions, TemplateRenderer};
use crate::context::Context;
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Looks templates up in the per-call template dir, then the renderer's
/// default dir, then the templates compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct FsTemplateRenderer {
    builtins: HashMap<String, String>,
    default_dir: Option<PathBuf>,
}

impl FsTemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.builtins.insert(id.into(), source.into());
        self
    }

    pub fn with_builtins<I, K, V>(mut self, builtins: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.builtins
            .extend(builtins.into_iter().map(|(id, src)| (id.into(), src.into())));
        self
    }

    pub fn default_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.default_dir = dir;
        self
    }

    fn lookup_file(&self, template_id: &str, template_dir: Option<&Path>) -> Result<Option<PathBuf>> {
        for dir in template_dir.into_iter().chain(self.default_dir.as_deref()) {
            if !dir.is_dir() {
                continue;
            }
            let manifest = TemplateManifest::load(dir)?;
            if let Some(path) = manifest.resolve(dir, template_id) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    async fn source(&self, template_id: &str, template_dir: Option<&Path>) -> Result<String> {
        if let Some(path) = self.lookup_file(template_id, template_dir)? {
            tracing::debug!(template = template_id, path = %path.display(), "using template file");
            return fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read template {}", path.display()));
        }

        self.builtins.get(template_id).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "Template '{}' not found in template directories or built-in templates",
                template_id
            )
        })
    }
}

#[async_trait]
impl TemplateRenderer for FsTemplateRenderer {
    async fn exists(&self, template_id: &str, template_dir: Option<&Path>) -> bool {
        matches!(self.lookup_file(template_id, template_dir), Ok(Some(_)))
            || self.builtins.contains_key(template_id)
    }

    async fn render(
        &self,
        template_id: &str,
        data: &Context,
        options: &RenderOptions,
    ) -> Result<PathBuf> {
        let source = self
            .source(template_id, options.template_dir.as_deref())
            .await?;
        let rendered = data.interpolate(&source);

        if let Some(parent) = options.output.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&options.output, rendered)
            .await
            .with_context(|| format!("Failed to write file: {}", options.output.display()))?;

        Ok(options.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_render_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let renderer =
            FsTemplateRenderer::new().with_builtin("service", "export class {{symbolName}} {}\n");
        let data = Context::from_value(json!({"symbolName": "UserService"}));
        let output = dir.path().join("src/services/user.service.ts");

        let written = renderer
            .render("service", &data, &RenderOptions::new(&output))
            .await
            .unwrap();

        assert_eq!(written, output);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "export class UserService {}\n"
        );
    }

    #[tokio::test]
    async fn test_template_dir_overrides_builtin() {
        let templates = tempfile::tempdir().unwrap();
        std::fs::write(templates.path().join("service.hbs"), "custom {{symbolName}}").unwrap();
        let out = tempfile::tempdir().unwrap();
        let renderer = FsTemplateRenderer::new().with_builtin("service", "builtin");
        let data = Context::from_value(json!({"symbolName": "A"}));

        let options = RenderOptions::new(out.path().join("a.ts"))
            .template_dir(Some(templates.path().to_path_buf()));
        renderer.render("service", &data, &options).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(out.path().join("a.ts")).unwrap(),
            "custom A"
        );
        assert!(renderer.exists("service", Some(templates.path())).await);
    }

    #[tokio::test]
    async fn test_missing_template() {
        let renderer = FsTemplateRenderer::new();
        assert!(!renderer.exists("nope", None).await);
        let err = renderer
            .render("nope", &Context::new(), &RenderOptions::new("out.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
