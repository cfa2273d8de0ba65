//! Plinth Core - provider registry and command lifecycle for plugin-based scaffolding
//!
//! Plugins ([`Hook`]s) claim generation types ("providers") and contribute
//! questions and tasks to commands. A [`Controller`] drives each command
//! through prompting, context mapping, pre-exec and execution, running the
//! collected [`TaskList`] tree with a [`TaskRunner`].
//!
//! # Architecture
//!
//! - **Registry and dispatch** - [`ProviderRegistry`], [`PluginHost`]
//! - **Prompting** - [`Question`], [`Answerer`], [`prompt::resolve`]
//! - **Execution** - [`Task`], [`TaskList`], [`TaskRunner`]
//! - **Lifecycle** - [`Command`], [`Controller`]
//! - **Collaborators** - [`Workspace`] (templates, `package.json`, package index)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based answerer and reporter
//!
//! # Example Usage
//!
//! ```ignore
//! use plinth_core::{Context, Controller, PluginHost, ScriptedAnswerer, Workspace};
//!
//! let host = PluginHost::builder().hook(MyGeneratorHook).build();
//! let controller = Controller::builder(host, Workspace::offline("."))
//!     .command(MyGenerateCommand)
//!     .build();
//!
//! let outcome = controller
//!     .run("generate", Context::new(), &mut ScriptedAnswerer::new())
//!     .await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod manifest;
pub mod naming;
pub mod plugin;
pub mod product;
pub mod prompt;
pub mod provider;
pub mod registry;
pub mod task;
pub mod templates;
pub mod version;
pub mod workspace;

#[cfg(feature = "tui")]
pub mod tui;

pub use config::ProjectConfig;
pub use context::{Context, SharedContext};
pub use error::CoreError;
pub use lifecycle::{Command, CommandOutcome, Controller, ControllerBuilder, LifecycleState};
pub use manifest::{PackageManager, PackageManifest};
pub use plugin::{Hook, PluginHost, PluginHostBuilder, TYPE_KEY};
pub use product::ProductConfig;
pub use prompt::{Answerer, Choice, Question, ScriptedAnswerer};
pub use provider::{OwnerId, ProviderDecl, ProviderInfo, ProviderRegistry};
pub use registry::{NpmRegistryClient, PackageIndex, PackageInfo, StaticIndex};
pub use task::{Task, TaskList, TaskOutcome, TaskRunner};
pub use templates::{FsTemplateRenderer, RenderOptions, TemplateRenderer};
pub use workspace::Workspace;
