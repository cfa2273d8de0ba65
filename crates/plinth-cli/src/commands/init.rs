//! `init`: create a project, then generate its default server and controller

use super::{generate, invalid};
use async_trait::async_trait;
use plinth_core::naming::kebab_case;
use plinth_core::prompt::{Choice, Question};
use plinth_core::{
    Command, Context, Controller, CoreError, PackageManager, Task, TaskList, Workspace,
};
use serde_json::{json, Value};

pub const NAME: &str = "init";

/// Optional features: (key, label, hint)
pub const FEATURES: &[(&str, &str, &str)] = &[
    ("swagger", "Swagger", "OpenAPI document served at /docs"),
    ("testing", "Testing", "Jest with ts-jest"),
    ("linter", "Linter", "ESLint with TypeScript rules"),
];

const DEPENDENCIES: &[(&str, &str)] = &[("express", "")];

const DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("typescript", ""),
    ("ts-node-dev", ""),
    ("@types/node", ""),
    ("@types/express", ""),
];

const SCRIPTS: &[(&str, &str)] = &[
    ("dev", "ts-node-dev --respawn {{sourceDir}}/index.ts"),
    ("build", "tsc"),
    ("start", "node dist/index.js"),
];

pub struct InitCommand;

impl InitCommand {
    fn default_project_name(workspace: &Workspace) -> Option<String> {
        workspace
            .root()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn selected_features(ctx: &mut Context, workspace: &Workspace) -> Result<Vec<String>, CoreError> {
        let selected: Vec<String> = match ctx.remove("features") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(list)) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::Null) | None => workspace.config().features.clone(),
            Some(other) => return Err(invalid(NAME, format!("invalid features: {}", other))),
        };

        if let Some(unknown) = selected
            .iter()
            .find(|f| !FEATURES.iter().any(|(key, _, _)| *key == f.as_str()))
        {
            return Err(invalid(NAME, format!("unknown feature '{}'", unknown)));
        }
        Ok(selected)
    }
}

#[async_trait]
impl Command for InitCommand {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Create a new project"
    }

    async fn questions(
        &self,
        _ctx: &Context,
        controller: &Controller,
    ) -> anyhow::Result<Vec<Question>> {
        let workspace = controller.workspace();

        let mut project_name = Question::input("projectName", "Project name");
        if let Some(default) = Self::default_project_name(workspace) {
            project_name = project_name.default(default);
        }

        let features = workspace.config().features.iter().fold(
            Question::multiselect(
                "features",
                "Which features do you want?",
                FEATURES
                    .iter()
                    .map(|(key, label, hint)| Choice::new(*key, *label).hint(*hint))
                    .collect(),
            ),
            |question, feature| question.default(feature.clone()),
        );

        let package_manager = Question::select(
            "packageManager",
            "Package manager",
            PackageManager::ALL
                .iter()
                .map(|pm| Choice::new(pm.binary(), pm.binary()))
                .collect(),
        )
        .default(workspace.package_manager().binary());

        Ok(vec![project_name, features, package_manager])
    }

    fn map_context(&self, mut ctx: Context, controller: &Controller) -> Result<Context, CoreError> {
        let workspace = controller.workspace();

        let project_name = ctx
            .get_str("projectName")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| Self::default_project_name(workspace))
            .ok_or_else(|| invalid(NAME, "a project name is required"))?;

        let package_manager = match ctx.get_str("packageManager") {
            Some(pm) => pm
                .parse::<PackageManager>()
                .map_err(|e| invalid(NAME, e.to_string()))?,
            None => workspace.package_manager(),
        };

        let selected = Self::selected_features(&mut ctx, workspace)?;
        for (key, _, _) in FEATURES {
            ctx.set(*key, selected.iter().any(|f| f.as_str() == *key));
        }

        ctx.set("packageName", kebab_case(&project_name));
        ctx.set("projectName", project_name);
        ctx.set("packageManager", package_manager.binary());
        ctx.set(
            "sourceDir",
            workspace.config().source_dir.to_string_lossy().replace('\\', "/"),
        );
        Ok(ctx)
    }

    async fn pre_exec(&self, ctx: &Context, controller: &Controller) -> anyhow::Result<TaskList> {
        let root = controller.workspace().root().to_path_buf();
        let workspace = controller.workspace().clone();
        let package_manager = package_manager(ctx, &workspace)?;
        let ctx = ctx.clone();

        let install = {
            let workspace = workspace.clone();
            Task::new("Install dependencies with {{packageManager}}", move |_| async move {
                workspace.install(package_manager).await?;
                Ok(())
            })
        };

        Ok(TaskList::sequential(vec![
            Task::new("Create {{projectName}} directory", move |_| async move {
                tokio::fs::create_dir_all(&root).await?;
                Ok(())
            }),
            Task::new("Prepare package.json", move |_| async move {
                let mut manifest = workspace.manifest().await;
                manifest.set_name(ctx.get_str("packageName").unwrap_or_default());
                manifest.set_version("0.1.0");
                manifest.add_dependencies(DEPENDENCIES.iter().copied(), &ctx);
                manifest.add_dev_dependencies(DEV_DEPENDENCIES.iter().copied(), &ctx);
                manifest.add_scripts(
                    SCRIPTS
                        .iter()
                        .map(|(name, command)| (*name, ctx.interpolate(command))),
                );
                manifest.save().await?;
                Ok(())
            }),
            install,
        ]))
    }

    /// Feature plugins declare their dependencies while exec tasks are
    /// collected, so the manifest is dirty again by the time these run.
    async fn tasks(&self, ctx: &Context, controller: &Controller) -> anyhow::Result<TaskList> {
        let workspace = controller.workspace();
        let source_dir = ctx.get_str("sourceDir").unwrap_or("src");
        let package_manager = package_manager(ctx, workspace)?;

        let files = TaskList::concurrent(vec![
            render_task(workspace, ctx, "project/tsconfig", "tsconfig.json"),
            render_task(workspace, ctx, "project/gitignore", ".gitignore"),
            render_task(workspace, ctx, "project/readme", "README.md"),
            render_task(workspace, ctx, "project/index", &format!("{}/index.ts", source_dir)),
        ]);

        let update = {
            let workspace = workspace.clone();
            Task::new("Install feature dependencies", move |_| async move {
                if !workspace.manifest().await.is_dirty() {
                    return Ok(());
                }
                workspace.install(package_manager).await?;
                Ok(())
            })
        };

        Ok(TaskList::sequential(vec![
            Task::group("Write project files", files),
            update,
            controller.expand(
                generate::NAME,
                "Generate default server",
                Context::from_value(json!({"type": "server", "name": "app"})),
            ),
            controller.expand(
                generate::NAME,
                "Generate default controller",
                Context::from_value(json!({"type": "controller", "name": "health", "route": "/health"})),
            ),
        ]))
    }
}

fn package_manager(ctx: &Context, workspace: &Workspace) -> anyhow::Result<PackageManager> {
    Ok(ctx
        .get_str("packageManager")
        .map(str::parse::<PackageManager>)
        .transpose()?
        .unwrap_or_else(|| workspace.package_manager()))
}

/// Task rendering `template_id` with `ctx` to `output` (relative to the project root)
pub(crate) fn render_task(workspace: &Workspace, ctx: &Context, template_id: &str, output: &str) -> Task {
    let workspace = workspace.clone();
    let ctx = ctx.clone();
    let template_id = template_id.to_string();
    let output = output.to_string();

    Task::new(format!("Write {}", output), move |_| async move {
        workspace.render(&template_id, &ctx, &output).await?;
        Ok(())
    })
}
