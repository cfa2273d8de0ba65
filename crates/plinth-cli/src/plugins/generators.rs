//! Generators for the plain artifact types

use crate::commands::generate;
use async_trait::async_trait;
use plinth_core::{Context, Hook, ProviderDecl, Task, TaskList, Workspace};

/// Renders `<type>` templates for controllers, services, middlewares, servers and models
pub struct GeneratorsHook;

#[async_trait]
impl Hook for GeneratorsHook {
    fn providers(&self) -> Vec<ProviderDecl> {
        vec![
            ProviderDecl::new("controller", "Controller"),
            ProviderDecl::new("service", "Service"),
            ProviderDecl::new("middleware", "Middleware"),
            ProviderDecl::new("server", "Server"),
            ProviderDecl::new("model", "Model"),
        ]
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

        if ctx.get_str("type") == Some("server") {
            workspace.manifest().await.add_dependency("express", None);
        }

        Ok(TaskList::sequential(vec![render_symbol(workspace, ctx)]))
    }
}

/// Render the context's `templateId` to its `outputFile`
pub(crate) fn render_symbol(workspace: &Workspace, ctx: &Context) -> Task {
    let workspace = workspace.clone();
    let ctx = ctx.clone();

    Task::new("Create {{outputFile}}", move |_| async move {
        let template = ctx.get_str("templateId").unwrap_or_default();
        let output = ctx.get_str("outputFile").unwrap_or_default();
        if template.is_empty() || output.is_empty() {
            anyhow::bail!("Nothing to render: template or output file missing from context");
        }
        workspace.render(template, &ctx, output).await?;
        Ok(())
    })
}
