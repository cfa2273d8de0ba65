//! Plugin host: hook registration, prompt collection and task dispatch

use super::Hook;
use crate::context::Context;
use crate::error::CoreError;
use crate::prompt::{Choice, Question};
use crate::provider::{ProviderInfo, ProviderRegistry};
use crate::task::TaskList;
use crate::workspace::Workspace;
use std::collections::HashMap;
use std::sync::Arc;

/// Context key holding the provider value an invocation targets
pub const TYPE_KEY: &str = "type";

/// Collects hooks before the host is frozen
#[derive(Default)]
pub struct PluginHostBuilder {
    hooks: Vec<Arc<dyn Hook>>,
}

impl PluginHostBuilder {
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Register every hook's providers and build the dispatch table
    pub fn build(self) -> PluginHost {
        let mut providers = ProviderRegistry::new();
        let mut dispatch = HashMap::new();
        let mut declares_providers = Vec::with_capacity(self.hooks.len());

        for (index, hook) in self.hooks.iter().enumerate() {
            let owner = hook.owner();
            let decls = hook.providers();
            declares_providers.push(!decls.is_empty());

            for decl in decls {
                dispatch.insert(decl.value.clone(), index);
                providers.register(decl, owner);
            }
        }

        tracing::debug!(
            hooks = self.hooks.len(),
            providers = providers.len(),
            "plugin host ready"
        );

        PluginHost {
            hooks: self.hooks,
            declares_providers,
            providers,
            dispatch,
        }
    }
}

/// Registered hooks plus the provider registry they populated
pub struct PluginHost {
    hooks: Vec<Arc<dyn Hook>>,
    declares_providers: Vec<bool>,
    providers: ProviderRegistry,
    dispatch: HashMap<String, usize>,
}

impl PluginHost {
    pub fn builder() -> PluginHostBuilder {
        PluginHostBuilder::default()
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Registered providers as select choices, in registration order
    pub fn provider_choices(&self) -> Vec<Choice> {
        self.providers.choices()
    }

    /// Provider targeted by `ctx`, if the context names one
    pub fn target(&self, ctx: &Context) -> Result<Option<&ProviderInfo>, CoreError> {
        match ctx.get_str(TYPE_KEY) {
            Some(value) => self.providers.get(value).map(Some),
            None => Ok(None),
        }
    }

    /// Gather the questions every hook contributes to `command`, in hook order
    pub async fn collect_questions(
        &self,
        command: &str,
        ctx: &Context,
        workspace: &Workspace,
    ) -> Result<Vec<Question>, CoreError> {
        let mut questions = Vec::new();
        for hook in &self.hooks {
            let contributed = hook
                .on_prompt(command, ctx, workspace)
                .await
                .map_err(|source| CoreError::Hook {
                    hook: hook.owner().to_string(),
                    command: command.to_string(),
                    source,
                })?;
            questions.extend(contributed);
        }
        Ok(questions)
    }

    /// Gather the tasks hooks contribute to `command`.
    ///
    /// When the context names a provider type, hooks that declared providers
    /// are only consulted if they own that type; hooks without providers are
    /// always consulted. An unregistered type is an error.
    pub async fn collect_tasks(
        &self,
        command: &str,
        ctx: &Context,
        workspace: &Workspace,
    ) -> Result<TaskList, CoreError> {
        let owner_index = match ctx.get_str(TYPE_KEY) {
            Some(value) => Some(
                *self
                    .dispatch
                    .get(value)
                    .ok_or_else(|| self.providers.unknown(value))?,
            ),
            None => None,
        };

        let mut tasks = TaskList::new();
        for (index, hook) in self.hooks.iter().enumerate() {
            if self.declares_providers[index] && owner_index.is_some_and(|owner| owner != index) {
                continue;
            }

            let contributed = hook
                .on_exec(command, ctx, workspace)
                .await
                .map_err(|source| CoreError::Hook {
                    hook: hook.owner().to_string(),
                    command: command.to_string(),
                    source,
                })?;

            tracing::debug!(
                command,
                hook = %hook.owner(),
                tasks = contributed.len(),
                "hook contributed tasks"
            );
            tasks.append(contributed);
        }

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{OwnerId, ProviderDecl};
    use crate::task::Task;
    use crate::workspace::Workspace;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct GeneratorHook {
        value: &'static str,
        exec_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Hook for GeneratorHook {
        fn owner(&self) -> OwnerId {
            OwnerId::named(self.value)
        }

        fn providers(&self) -> Vec<ProviderDecl> {
            vec![ProviderDecl::new(self.value, self.value.to_uppercase())]
        }

        async fn on_exec(
            &self,
            _command: &str,
            _ctx: &Context,
            _workspace: &Workspace,
        ) -> anyhow::Result<TaskList> {
            self.exec_calls.fetch_add(1, Ordering::SeqCst);
            Ok(TaskList::sequential(vec![Task::new(
                format!("Generate {}", self.value),
                |_| async { Ok(()) },
            )]))
        }
    }

    struct ObserverHook;

    #[async_trait]
    impl Hook for ObserverHook {
        async fn on_prompt(
            &self,
            command: &str,
            _ctx: &Context,
            _workspace: &Workspace,
        ) -> anyhow::Result<Vec<Question>> {
            Ok(vec![Question::input(format!("{}Note", command), "Note")])
        }

        async fn on_exec(
            &self,
            command: &str,
            _ctx: &Context,
            _workspace: &Workspace,
        ) -> anyhow::Result<TaskList> {
            Ok(TaskList::sequential(vec![Task::new(
                format!("Observe {}", command),
                |_| async { Ok(()) },
            )]))
        }
    }

    fn three_generators() -> (PluginHost, Vec<Arc<AtomicUsize>>) {
        let counters: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let host = PluginHost::builder()
            .hook(GeneratorHook {
                value: "protocol",
                exec_calls: counters[0].clone(),
            })
            .hook(GeneratorHook {
                value: "controller",
                exec_calls: counters[1].clone(),
            })
            .hook(GeneratorHook {
                value: "server",
                exec_calls: counters[2].clone(),
            })
            .build();
        (host, counters)
    }

    #[tokio::test]
    async fn test_dispatch_only_to_owner() {
        let (host, counters) = three_generators();
        let workspace = Workspace::offline(std::env::temp_dir());
        let ctx = Context::from_value(json!({"type": "controller"}));

        let tasks = host.collect_tasks("generate", &ctx, &workspace).await.unwrap();

        assert_eq!(tasks.titles(), vec!["Generate controller"]);
        assert_eq!(counters[0].load(Ordering::SeqCst), 0);
        assert_eq!(counters[1].load(Ordering::SeqCst), 1);
        assert_eq!(counters[2].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unregistered_type_fails() {
        let (host, _) = three_generators();
        let workspace = Workspace::offline(std::env::temp_dir());
        let ctx = Context::from_value(json!({"type": "graphql"}));

        let err = host
            .collect_tasks("generate", &ctx, &workspace)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownProvider { .. }));
    }

    #[tokio::test]
    async fn test_hooks_without_providers_always_contribute_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let host = PluginHost::builder()
            .hook(ObserverHook)
            .hook(GeneratorHook {
                value: "server",
                exec_calls: counter,
            })
            .build();
        let workspace = Workspace::offline(std::env::temp_dir());

        let typed = Context::from_value(json!({"type": "server"}));
        let tasks = host.collect_tasks("generate", &typed, &workspace).await.unwrap();
        assert_eq!(tasks.titles(), vec!["Observe generate", "Generate server"]);

        let untyped = Context::new();
        let tasks = host.collect_tasks("init", &untyped, &workspace).await.unwrap();
        assert_eq!(tasks.titles(), vec!["Observe init", "Generate server"]);
    }

    #[tokio::test]
    async fn test_collect_questions_concatenates() {
        let host = PluginHost::builder().hook(ObserverHook).hook(ObserverHook).build();
        let workspace = Workspace::offline(std::env::temp_dir());
        let questions = host
            .collect_questions("generate", &Context::new(), &workspace)
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].name, "generateNote");
    }

    #[test]
    fn test_provider_choices_in_registration_order() {
        let (host, _) = three_generators();
        let values: Vec<_> = host
            .provider_choices()
            .into_iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec!["protocol", "controller", "server"]);
        assert!(host
            .providers()
            .is_owned_by("server", OwnerId::named("server"))
            .unwrap());
    }
}
