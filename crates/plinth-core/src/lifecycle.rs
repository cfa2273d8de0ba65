//! Command lifecycle
//!
//! A command runs through fixed phases:
//!
//! ```text
//! Init -> Prompted -> ContextMapped -> PreExec -> Executing -> Done
//! ```
//!
//! Any phase may fail, which ends the invocation. Nothing is retried and
//! nothing already written is rolled back.
//!
//! A command can embed another one with [`Controller::expand`]: the nested
//! command skips prompting, maps a copy of the parent's context and its task
//! tree runs as part of the parent task.

use crate::context::{Context, SharedContext};
use crate::error::CoreError;
use crate::plugin::PluginHost;
use crate::prompt::{self, Answerer, Question};
use crate::task::{Task, TaskList, TaskRunner};
use crate::workspace::Workspace;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A top-level operation such as `init` or `generate`
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    /// Questions asked before any hook question
    async fn questions(
        &self,
        _ctx: &Context,
        _controller: &Controller,
    ) -> anyhow::Result<Vec<Question>> {
        Ok(Vec::new())
    }

    /// Turn collected answers into the context tasks run with. Must not
    /// perform I/O: it also runs when the command is expanded inside another.
    fn map_context(&self, ctx: Context, _controller: &Controller) -> Result<Context, CoreError> {
        Ok(ctx)
    }

    /// Preparation tasks, run to completion before any exec task is collected
    async fn pre_exec(&self, _ctx: &Context, _controller: &Controller) -> anyhow::Result<TaskList> {
        Ok(TaskList::new())
    }

    /// The command's own exec tasks, placed before hook tasks
    async fn tasks(&self, _ctx: &Context, _controller: &Controller) -> anyhow::Result<TaskList> {
        Ok(TaskList::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Init,
    Prompted,
    ContextMapped,
    PreExec,
    Executing,
    Done,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Init => "init",
            LifecycleState::Prompted => "prompted",
            LifecycleState::ContextMapped => "context_mapped",
            LifecycleState::PreExec => "pre_exec",
            LifecycleState::Executing => "executing",
            LifecycleState::Done => "done",
            LifecycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a completed command
#[derive(Debug)]
pub struct CommandOutcome {
    /// Context as left by the last task
    pub context: Context,
    pub state: LifecycleState,
}

struct Inner {
    host: PluginHost,
    workspace: Workspace,
    runner: TaskRunner,
    commands: Vec<Arc<dyn Command>>,
}

/// Drives commands against one plugin host and workspace. Cheap to clone.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

pub struct ControllerBuilder {
    host: PluginHost,
    workspace: Workspace,
    runner: TaskRunner,
    commands: Vec<Arc<dyn Command>>,
}

impl ControllerBuilder {
    /// Register a command. A later command with the same name replaces it.
    pub fn command<C: Command + 'static>(mut self, command: C) -> Self {
        let command: Arc<dyn Command> = Arc::new(command);
        match self
            .commands
            .iter()
            .position(|c| c.name() == command.name())
        {
            Some(index) => self.commands[index] = command,
            None => self.commands.push(command),
        }
        self
    }

    pub fn runner(mut self, runner: TaskRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn build(self) -> Controller {
        Controller {
            inner: Arc::new(Inner {
                host: self.host,
                workspace: self.workspace,
                runner: self.runner,
                commands: self.commands,
            }),
        }
    }
}

impl Controller {
    pub fn builder(host: PluginHost, workspace: Workspace) -> ControllerBuilder {
        ControllerBuilder {
            host,
            workspace,
            runner: TaskRunner::silent(),
            commands: Vec::new(),
        }
    }

    pub fn host(&self) -> &PluginHost {
        &self.inner.host
    }

    pub fn workspace(&self) -> &Workspace {
        &self.inner.workspace
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.inner.runner
    }

    pub fn commands(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.inner.commands.iter()
    }

    pub fn command(&self, name: &str) -> Result<Arc<dyn Command>, CoreError> {
        self.inner
            .commands
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownCommand {
                name: name.to_string(),
                available: self
                    .inner
                    .commands
                    .iter()
                    .map(|c| c.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Run `name` end to end, starting from `input` (typically CLI flags)
    pub async fn run(
        &self,
        name: &str,
        input: Context,
        answerer: &mut dyn Answerer,
    ) -> Result<CommandOutcome, CoreError> {
        let command = self.command(name)?;
        let mut state = LifecycleState::Init;
        tracing::debug!(command = name, state = %state, "command started");

        match self.drive(command.as_ref(), input, answerer, &mut state).await {
            Ok(context) => {
                enter(&mut state, LifecycleState::Done, name);
                Ok(CommandOutcome { context, state })
            }
            Err(err) => {
                tracing::error!(command = name, phase = %state, error = %err, "command failed");
                enter(&mut state, LifecycleState::Failed, name);
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        command: &dyn Command,
        input: Context,
        answerer: &mut dyn Answerer,
        state: &mut LifecycleState,
    ) -> Result<Context, CoreError> {
        let name = command.name();
        let workspace = self.workspace();

        let mut questions = command
            .questions(&input, self)
            .await
            .map_err(|source| command_error(name, "prompt", source))?;
        questions.extend(self.host().collect_questions(name, &input, workspace).await?);
        let answers = prompt::resolve(&questions, input, answerer).await?;
        enter(state, LifecycleState::Prompted, name);

        let mapped = command.map_context(answers, self)?;
        enter(state, LifecycleState::ContextMapped, name);

        let shared = SharedContext::new(mapped);
        enter(state, LifecycleState::PreExec, name);
        let pre = command
            .pre_exec(&shared.snapshot().await, self)
            .await
            .map_err(|source| command_error(name, "pre-exec", source))?;
        self.runner().run(pre, &shared).await?;

        enter(state, LifecycleState::Executing, name);
        let ctx = shared.snapshot().await;
        let mut tasks = command
            .tasks(&ctx, self)
            .await
            .map_err(|source| command_error(name, "exec", source))?;
        tasks.append(self.host().collect_tasks(name, &ctx, workspace).await?);
        self.runner().run(tasks, &shared).await?;

        Ok(shared.snapshot().await)
    }

    /// Embed command `name` as a task of the running command.
    ///
    /// When the task runs, `overrides` are merged over a copy of the running
    /// context and mapped by the nested command. Its pre-exec, own and hook
    /// tasks then run in that order as children of the returned task. Child
    /// titles are rendered against the nested context.
    pub fn expand(&self, name: impl Into<String>, title: impl Into<String>, overrides: Context) -> Task {
        let controller = self.clone();
        let name = name.into();

        Task::expand(title, move |ctx: SharedContext| async move {
            let command = controller.command(&name)?;
            let mut child = ctx.snapshot().await;
            child.merge(overrides);
            let child = command.map_context(child, &controller)?;
            tracing::debug!(command = %name, "expanding nested command");

            let mut list = TaskList::new();
            list.append(
                command
                    .pre_exec(&child, &controller)
                    .await
                    .map_err(|source| command_error(&name, "pre-exec", source))?,
            );
            list.append(
                command
                    .tasks(&child, &controller)
                    .await
                    .map_err(|source| command_error(&name, "exec", source))?,
            );
            list.append(
                controller
                    .host()
                    .collect_tasks(&name, &child, controller.workspace())
                    .await?,
            );
            list.render_titles(&child);
            Ok(list)
        })
    }
}

fn enter(state: &mut LifecycleState, next: LifecycleState, command: &str) {
    tracing::debug!(command, from = %state, to = %next, "lifecycle transition");
    *state = next;
}

fn command_error(command: &str, phase: &'static str, source: anyhow::Error) -> CoreError {
    CoreError::Command {
        command: command.to_string(),
        phase,
        source,
    }
}
