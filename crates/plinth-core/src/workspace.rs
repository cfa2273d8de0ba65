//! Target project handle shared by commands and hooks

use crate::config::ProjectConfig;
use crate::context::Context;
use crate::error::CoreError;
use crate::manifest::{PackageManager, PackageManifest};
use crate::registry::{PackageIndex, StaticIndex};
use crate::templates::{FsTemplateRenderer, RenderOptions, TemplateRenderer};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, MutexGuard};

/// The project being generated into: its root, configuration, `package.json`
/// and the collaborators used to fill it. Cloning shares the same manifest.
#[derive(Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Arc<ProjectConfig>,
    manifest: Arc<Mutex<PackageManifest>>,
    renderer: Arc<dyn TemplateRenderer>,
    index: Arc<dyn PackageIndex>,
    package_manager: Arc<OnceLock<PackageManager>>,
    skip_install: bool,
}

impl Workspace {
    /// Workspace with an empty manifest at `<root>/package.json`
    pub fn new(
        root: impl Into<PathBuf>,
        config: ProjectConfig,
        renderer: Arc<dyn TemplateRenderer>,
        index: Arc<dyn PackageIndex>,
    ) -> Self {
        let root = root.into();
        let manifest = PackageManifest::new(root.join("package.json"));
        Self {
            root,
            config: Arc::new(config),
            manifest: Arc::new(Mutex::new(manifest)),
            renderer,
            index,
            package_manager: Arc::new(OnceLock::new()),
            skip_install: false,
        }
    }

    /// Workspace whose manifest starts from the existing `package.json`, if any
    pub async fn open(
        root: impl Into<PathBuf>,
        config: ProjectConfig,
        renderer: Arc<dyn TemplateRenderer>,
        index: Arc<dyn PackageIndex>,
    ) -> Result<Self, CoreError> {
        let mut workspace = Self::new(root, config, renderer, index);
        let path = workspace.root.join("package.json");
        let manifest = PackageManifest::load(&path)
            .await
            .map_err(|source| CoreError::Manifest { path, source })?;
        workspace.manifest = Arc::new(Mutex::new(manifest));
        Ok(workspace)
    }

    /// Default configuration, no built-in templates, an empty package index
    /// and installs disabled
    pub fn offline(root: impl Into<PathBuf>) -> Self {
        Self::new(
            root,
            ProjectConfig::default(),
            Arc::new(FsTemplateRenderer::new()),
            Arc::new(StaticIndex::default()),
        )
        .skip_install(true)
    }

    pub fn skip_install(mut self, skip: bool) -> Self {
        self.skip_install = skip;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Absolute source directory
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.config.source_dir)
    }

    pub fn template_dir(&self) -> Option<PathBuf> {
        self.config.template_dir(&self.root)
    }

    pub fn renderer(&self) -> &Arc<dyn TemplateRenderer> {
        &self.renderer
    }

    pub fn index(&self) -> &Arc<dyn PackageIndex> {
        &self.index
    }

    pub fn installs_skipped(&self) -> bool {
        self.skip_install
    }

    /// Exclusive access to the project's `package.json`
    pub async fn manifest(&self) -> MutexGuard<'_, PackageManifest> {
        self.manifest.lock().await
    }

    /// Configured package manager, else the one detected for the root.
    /// Detection runs at most once per workspace.
    pub fn package_manager(&self) -> PackageManager {
        *self
            .package_manager
            .get_or_init(|| self.config.package_manager(&self.root))
    }

    /// Render `template_id` to `output`; relative outputs are resolved against the root
    pub async fn render(
        &self,
        template_id: &str,
        data: &Context,
        output: impl AsRef<Path>,
    ) -> Result<PathBuf, CoreError> {
        let output = self.root.join(output);
        let options = RenderOptions::new(output).template_dir(self.template_dir());
        let written = self
            .renderer
            .render(template_id, data, &options)
            .await
            .map_err(|source| CoreError::Template {
                template: template_id.to_string(),
                source,
            })?;
        tracing::debug!(template = template_id, path = %written.display(), "rendered template");
        Ok(written)
    }

    /// Resolve pending versions, write `package.json` and run `package_manager install`
    pub async fn install(&self, package_manager: PackageManager) -> Result<(), CoreError> {
        let path = {
            let mut manifest = self.manifest.lock().await;
            manifest.resolve_versions(self.index.as_ref()).await;
            manifest.save().await.map_err(|source| CoreError::Manifest {
                path: manifest.path().to_path_buf(),
                source,
            })?;
            manifest.path().to_path_buf()
        };

        if self.skip_install {
            tracing::info!(path = %path.display(), "manifest written, install skipped");
            return Ok(());
        }

        package_manager
            .install(&self.root)
            .await
            .map_err(|source| CoreError::Manifest { path, source })
    }
}
