//! Plinth CLI - built-in commands and plugins for the `plinth` binary
//!
//! The binary only parses arguments and picks an answerer; everything a
//! command does is wired here so it can be driven from tests as well.

pub mod commands;
pub mod plugins;
pub mod product;
pub mod templates;

pub use commands::{GenerateCommand, InitCommand};
pub use product::{PlinthConfig, CLI_VERSION};

use plinth_core::{
    Controller, NpmRegistryClient, PackageIndex, ProductConfig, ProjectConfig, StaticIndex,
    TaskRunner, Workspace,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options shared by every command invocation
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    /// Overrides the project's configured template directory
    pub template_dir: Option<PathBuf>,
    /// Use an empty package index instead of the registry
    pub offline: bool,
    /// Write `package.json` without running the package manager
    pub skip_install: bool,
}

/// Open the project at `root` with the built-in templates and the configured registry
pub async fn open_workspace<C: ProductConfig>(
    product: &C,
    root: &Path,
    options: &WorkspaceOptions,
) -> anyhow::Result<Workspace> {
    let mut config = ProjectConfig::load(product, root)?;
    if let Some(dir) = &options.template_dir {
        config.template_dir = Some(dir.clone());
    }

    let index: Arc<dyn PackageIndex> = if options.offline {
        Arc::new(StaticIndex::default())
    } else {
        Arc::new(NpmRegistryClient::new(
            config.registry_url(product)?,
            product.user_agent(),
        ))
    };

    let workspace = Workspace::open(root, config, Arc::new(templates::renderer(None)), index)
        .await?
        .skip_install(options.skip_install);
    Ok(workspace)
}

/// Controller with the built-in commands and plugins
pub fn controller(workspace: Workspace, runner: TaskRunner) -> Controller {
    Controller::builder(plugins::host(), workspace)
        .runner(runner)
        .command(InitCommand)
        .command(GenerateCommand)
        .build()
}
