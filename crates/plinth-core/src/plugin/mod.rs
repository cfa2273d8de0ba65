//! Plugin hooks and the host that dispatches to them
//!
//! Hooks are registered once at startup. Every provider a hook declares is
//! recorded in the [`ProviderRegistry`] under the hook's [`OwnerId`], and a
//! dispatch table maps each provider value to the hook that registered it last.

mod host;

pub use host::{PluginHost, PluginHostBuilder, TYPE_KEY};

use crate::context::Context;
use crate::prompt::Question;
use crate::provider::{OwnerId, ProviderDecl};
use crate::task::TaskList;
use crate::workspace::Workspace;
use anyhow::Result;
use async_trait::async_trait;

/// A plugin component contributing questions and tasks to commands.
///
/// Both callbacks default to contributing nothing. A hook that declares
/// providers only receives `on_exec` for invocations whose `type` it owns.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Identity used for provider ownership
    fn owner(&self) -> OwnerId {
        OwnerId::of::<Self>()
    }

    /// Providers claimed by this hook
    fn providers(&self) -> Vec<ProviderDecl> {
        Vec::new()
    }

    async fn on_prompt(
        &self,
        _command: &str,
        _ctx: &Context,
        _workspace: &Workspace,
    ) -> Result<Vec<Question>> {
        Ok(Vec::new())
    }

    async fn on_exec(
        &self,
        _command: &str,
        _ctx: &Context,
        _workspace: &Workspace,
    ) -> Result<TaskList> {
        Ok(TaskList::new())
    }
}
