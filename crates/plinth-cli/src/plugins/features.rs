//! Optional project features contributed to `init`

use crate::commands::init::{self, render_task};
use async_trait::async_trait;
use plinth_core::{Context, Hook, TaskList, Workspace};

/// Declares what an enabled feature adds to a new project
struct FeatureSpec {
    flag: &'static str,
    dependencies: &'static [(&'static str, &'static str)],
    dev_dependencies: &'static [(&'static str, &'static str)],
    scripts: &'static [(&'static str, &'static str)],
    /// (template id, output path relative to the project root)
    files: &'static [(&'static str, &'static str)],
}

impl FeatureSpec {
    async fn contribute(&self, command: &str, ctx: &Context, workspace: &Workspace) -> TaskList {
        if command != init::NAME || !ctx.flag(self.flag) {
            return TaskList::new();
        }
        tracing::debug!(feature = self.flag, "feature enabled");

        {
            let mut manifest = workspace.manifest().await;
            manifest.add_dependencies(self.dependencies.iter().copied(), ctx);
            manifest.add_dev_dependencies(self.dev_dependencies.iter().copied(), ctx);
            manifest.add_scripts(
                self.scripts
                    .iter()
                    .map(|(name, command)| (*name, ctx.interpolate(command))),
            );
        }

        self.files
            .iter()
            .map(|(template, output)| render_task(workspace, ctx, template, &ctx.interpolate(output)))
            .collect()
    }
}

const SWAGGER: FeatureSpec = FeatureSpec {
    flag: "swagger",
    dependencies: &[("swagger-ui-express", ""), ("yaml", "")],
    dev_dependencies: &[("@types/swagger-ui-express", "")],
    scripts: &[],
    files: &[
        ("features/swagger", "{{sourceDir}}/docs.ts"),
        ("features/openapi", "openapi.yaml"),
    ],
};

const TESTING: FeatureSpec = FeatureSpec {
    flag: "testing",
    dependencies: &[],
    dev_dependencies: &[("jest", ""), ("ts-jest", ""), ("@types/jest", "")],
    scripts: &[("test", "jest")],
    files: &[("features/jest-config", "jest.config.js")],
};

const LINTER: FeatureSpec = FeatureSpec {
    flag: "linter",
    dependencies: &[],
    dev_dependencies: &[
        ("eslint", ""),
        ("@typescript-eslint/parser", ""),
        ("@typescript-eslint/eslint-plugin", ""),
    ],
    scripts: &[("lint", "eslint {{sourceDir}} --ext .ts")],
    files: &[("features/eslintrc", ".eslintrc.json")],
};

pub struct SwaggerFeature;

#[async_trait]
impl Hook for SwaggerFeature {
    async fn on_exec(
        &self,
        command: &str,
        ctx: &Context,
        workspace: &Workspace,
    ) -> anyhow::Result<TaskList> {
        Ok(SWAGGER.contribute(command, ctx, workspace).await)
    }
}

pub struct TestingFeature;

#[async_trait]
impl Hook for TestingFeature {
    async fn on_exec(
        &self,
        command: &str,
        ctx: &Context,
        workspace: &Workspace,
    ) -> anyhow::Result<TaskList> {
        Ok(TESTING.contribute(command, ctx, workspace).await)
    }
}

pub struct LinterFeature;

#[async_trait]
impl Hook for LinterFeature {
    async fn on_exec(
        &self,
        command: &str,
        ctx: &Context,
        workspace: &Workspace,
    ) -> anyhow::Result<TaskList> {
        Ok(LINTER.contribute(command, ctx, workspace).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_disabled_feature_contributes_nothing() {
        let workspace = Workspace::offline(std::env::temp_dir());
        let ctx = Context::from_value(json!({"linter": false}));
        let tasks = LinterFeature.on_exec("init", &ctx, &workspace).await.unwrap();
        assert!(tasks.is_empty());
        assert!(workspace.manifest().await.dev_dependencies().is_empty());
    }

    #[tokio::test]
    async fn test_enabled_feature_declares_dependencies_once() {
        let workspace = Workspace::offline(std::env::temp_dir());
        let ctx = Context::from_value(json!({"testing": true, "sourceDir": "src"}));

        TestingFeature.on_exec("init", &ctx, &workspace).await.unwrap();
        let tasks = TestingFeature.on_exec("init", &ctx, &workspace).await.unwrap();

        assert_eq!(tasks.titles(), vec!["Write jest.config.js"]);
        let manifest = workspace.manifest().await;
        assert_eq!(manifest.dev_dependencies().len(), 3);
        assert_eq!(manifest.scripts()["test"], "jest");
    }

    #[tokio::test]
    async fn test_feature_ignores_generate() {
        let workspace = Workspace::offline(std::env::temp_dir());
        let ctx = Context::from_value(json!({"swagger": true}));
        let tasks = SwaggerFeature.on_exec("generate", &ctx, &workspace).await.unwrap();
        assert!(tasks.is_empty());
    }
}
