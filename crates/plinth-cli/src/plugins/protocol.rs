//! Authentication protocols backed by passport strategies

use super::generators::render_symbol;
use crate::commands::generate;
use async_trait::async_trait;
use plinth_core::prompt::Question;
use plinth_core::registry::PackageSearchSource;
use plinth_core::{Context, Hook, ProviderDecl, TaskList, Workspace};
use std::sync::Arc;

/// Packages offered for the strategy question are found with this keyword
pub const STRATEGY_KEYWORD: &str = "passport-";
const SEARCH_SIZE: usize = 50;

pub struct ProtocolHook;

#[async_trait]
impl Hook for ProtocolHook {
    fn providers(&self) -> Vec<ProviderDecl> {
        vec![ProviderDecl::new("protocol", "Authentication protocol (passport strategy)")]
    }

    async fn on_prompt(
        &self,
        command: &str,
        _ctx: &Context,
        workspace: &Workspace,
    ) -> anyhow::Result<Vec<Question>> {
        if command != generate::NAME {
            return Ok(Vec::new());
        }

        let source = PackageSearchSource::new(workspace.index().clone(), STRATEGY_KEYWORD, SEARCH_SIZE);
        Ok(vec![Question::autocomplete(
            "passportPackage",
            "Which passport strategy?",
            Arc::new(source),
        )
        .when(|ctx| ctx.get_str("type") == Some("protocol"))])
    }

    async fn on_exec(
        &self,
        command: &str,
        ctx: &Context,
        workspace: &Workspace,
    ) -> anyhow::Result<TaskList> {
        if command != generate::NAME {
            return Ok(TaskList::new());
        }

        let strategy = ctx
            .get_str("passportPackage")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("No passport strategy selected"))?;

        {
            let mut manifest = workspace.manifest().await;
            manifest.add_dependency("passport", None);
            manifest.add_dependency(strategy, None);
        }

        Ok(TaskList::sequential(vec![render_symbol(workspace, ctx)]))
    }
}
