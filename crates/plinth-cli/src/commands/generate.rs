//! `generate`: add one artifact (controller, service, ...) to a project
//!
//! The type is chosen among registered providers. The owning plugin renders
//! the file; this command only derives names and paths from the answers.

use super::invalid;
use async_trait::async_trait;
use plinth_core::naming::{camel_case, kebab_case, pascal_case};
use plinth_core::prompt::Question;
use plinth_core::{Command, Context, Controller, CoreError, Task, TaskList, TYPE_KEY};

pub const NAME: &str = "generate";

pub struct GenerateCommand;

#[async_trait]
impl Command for GenerateCommand {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Generate a controller, service, server or any other registered type"
    }

    async fn questions(
        &self,
        _ctx: &Context,
        controller: &Controller,
    ) -> anyhow::Result<Vec<Question>> {
        Ok(vec![
            Question::select(TYPE_KEY, "What do you want to generate?", controller.host().provider_choices()),
            Question::input("name", "Name"),
            Question::input("route", "Route (empty to derive from the name)")
                .when(|ctx| ctx.get_str(TYPE_KEY) == Some("controller")),
        ])
    }

    fn map_context(&self, mut ctx: Context, controller: &Controller) -> Result<Context, CoreError> {
        let kind = ctx
            .get_str(TYPE_KEY)
            .ok_or_else(|| invalid(NAME, "a type is required"))?
            .to_string();
        let provider = controller.host().providers().get(&kind)?;

        let name = ctx
            .remove("name")
            .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid(NAME, "a name is required"))?;

        let suffix = pascal_case(&kind);
        let mut symbol_name = pascal_case(&name);
        if !symbol_name.ends_with(&suffix) {
            symbol_name.push_str(&suffix);
        }
        let base = symbol_name
            .strip_suffix(&suffix)
            .filter(|base| !base.is_empty())
            .unwrap_or(&symbol_name);
        let file_stem = kebab_case(base);

        let symbol_path = format!("{}s/{}.{}", kind, file_stem, kind);
        let source_dir = controller
            .workspace()
            .config()
            .source_dir
            .to_string_lossy()
            .replace('\\', "/");

        if kind == "controller" && ctx.get_str("route").map_or(true, str::is_empty) {
            ctx.set("route", format!("/{}", file_stem));
        }

        ctx.set("templateId", provider.template_id().to_string());
        ctx.set("symbolParamName", camel_case(&symbol_name));
        ctx.set("symbolName", symbol_name);
        ctx.set("symbolPath", symbol_path.clone());
        ctx.set("outputFile", format!("{}/{}.ts", source_dir, symbol_path));
        Ok(ctx)
    }

    /// Write `package.json` again when a plugin declared new dependencies
    async fn tasks(&self, _ctx: &Context, controller: &Controller) -> anyhow::Result<TaskList> {
        let workspace = controller.workspace().clone();
        Ok(TaskList::sequential(vec![Task::new(
            "Update dependencies",
            move |_| async move {
                if !workspace.manifest().await.is_dirty() {
                    return Ok(());
                }
                workspace.install(workspace.package_manager()).await?;
                Ok(())
            },
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins;
    use plinth_core::Workspace;
    use serde_json::json;

    fn controller() -> Controller {
        Controller::builder(plugins::host(), Workspace::offline(std::env::temp_dir()))
            .command(GenerateCommand)
            .build()
    }

    fn map(input: serde_json::Value) -> Result<Context, CoreError> {
        let controller = controller();
        GenerateCommand.map_context(Context::from_value(input), &controller)
    }

    #[test]
    fn test_mapping_derives_symbol_fields() {
        let ctx = map(json!({"type": "controller", "name": "user profile"})).unwrap();
        assert_eq!(ctx.get_str("symbolName"), Some("UserProfileController"));
        assert_eq!(ctx.get_str("symbolParamName"), Some("userProfileController"));
        assert_eq!(ctx.get_str("symbolPath"), Some("controllers/user-profile.controller"));
        assert_eq!(ctx.get_str("outputFile"), Some("src/controllers/user-profile.controller.ts"));
        assert_eq!(ctx.get_str("route"), Some("/user-profile"));
        assert!(!ctx.contains("name"));
    }

    #[test]
    fn test_mapping_keeps_explicit_suffix_and_route() {
        let ctx = map(json!({"type": "controller", "name": "UserController", "route": "/users"}))
            .unwrap();
        assert_eq!(ctx.get_str("symbolName"), Some("UserController"));
        assert_eq!(ctx.get_str("route"), Some("/users"));
    }

    #[test]
    fn test_mapping_keeps_prompt_answers() {
        let ctx = Context::from_value(json!({"type": "protocol"}))
            .with("passportPackage", "p1")
            .with("name", "github");
        let controller = controller();
        let mapped = GenerateCommand.map_context(ctx, &controller).unwrap();

        assert_eq!(mapped.get_str("type"), Some("protocol"));
        assert_eq!(mapped.get_str("passportPackage"), Some("p1"));
        assert_eq!(mapped.get_str("symbolName"), Some("GithubProtocol"));
        assert_eq!(mapped.get_str("outputFile"), Some("src/protocols/github.protocol.ts"));
        assert!(!mapped.contains("route"));
    }

    #[test]
    fn test_mapping_rejects_missing_name_and_unknown_type() {
        assert!(matches!(
            map(json!({"type": "service", "name": "  "})),
            Err(CoreError::InvalidContext { .. })
        ));
        assert!(matches!(
            map(json!({"type": "graphql", "name": "x"})),
            Err(CoreError::UnknownProvider { .. })
        ));
    }
}
