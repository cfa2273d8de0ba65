//! Template lookup and rendering
//!
//! This module provides:
//! - The [`TemplateRenderer`] trait used by generator hooks
//! - A filesystem renderer searching template directories, then built-ins
//! - Template directory manifests (`templates.yaml` or `*.hbs` discovery)

pub mod manifest;
pub mod renderer;

use crate::context::Context;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use manifest::{TemplateEntry, TemplateManifest, TEMPLATE_EXTENSION};
pub use renderer::FsTemplateRenderer;

/// Where a rendered template goes and where overrides are looked up
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub output: PathBuf,
    pub template_dir: Option<PathBuf>,
}

impl RenderOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            template_dir: None,
        }
    }

    pub fn template_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.template_dir = dir;
        self
    }
}

#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    /// Whether `template_id` can be found in `template_dir` or the built-ins
    async fn exists(&self, template_id: &str, template_dir: Option<&Path>) -> bool;

    /// Render `template_id` with `data` into `options.output`, returning the written path
    async fn render(
        &self,
        template_id: &str,
        data: &Context,
        options: &RenderOptions,
    ) -> Result<PathBuf>;
}
