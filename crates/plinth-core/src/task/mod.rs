//! Tasks and task lists
//!
//! A [`Task`] is a titled unit of asynchronous work. Its action either finishes
//! or expands into a further [`TaskList`], which is how a command embeds the
//! full task tree of a nested command.

mod reporter;
mod runner;

pub use reporter::{ConsoleReporter, SilentReporter, TaskReporter};
pub use runner::TaskRunner;

use crate::context::{Context, SharedContext};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;

/// What a task action produced
pub enum TaskOutcome {
    Done,
    /// Run this list to completion as part of the current task
    Expand(TaskList),
}

type Action = Box<dyn FnOnce(SharedContext) -> BoxFuture<'static, anyhow::Result<TaskOutcome>> + Send>;
type Enabled = Box<dyn Fn(&Context) -> bool + Send + Sync>;

pub struct Task {
    title: String,
    action: Action,
    enabled: Option<Enabled>,
}

impl Task {
    /// Task running `action`. `title` may contain `{{key}}` placeholders,
    /// resolved against the context when the task runs.
    pub fn new<F, Fut>(title: impl Into<String>, action: F) -> Self
    where
        F: FnOnce(SharedContext) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            title: title.into(),
            action: Box::new(move |ctx: SharedContext| {
                async move {
                    action(ctx).await?;
                    Ok::<_, anyhow::Error>(TaskOutcome::Done)
                }
                .boxed()
            }),
            enabled: None,
        }
    }

    /// Task whose action builds a nested task list at run time
    pub fn expand<F, Fut>(title: impl Into<String>, action: F) -> Self
    where
        F: FnOnce(SharedContext) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<TaskList>> + Send + 'static,
    {
        Self {
            title: title.into(),
            action: Box::new(move |ctx: SharedContext| {
                async move { Ok::<_, anyhow::Error>(TaskOutcome::Expand(action(ctx).await?)) }
                    .boxed()
            }),
            enabled: None,
        }
    }

    /// Task wrapping an already-built list. An empty title makes the group
    /// transparent: only its children are reported.
    pub fn group(title: impl Into<String>, list: TaskList) -> Self {
        Self {
            title: title.into(),
            action: Box::new(move |_ctx: SharedContext| {
                async move { Ok::<_, anyhow::Error>(TaskOutcome::Expand(list)) }.boxed()
            }),
            enabled: None,
        }
    }

    /// Only run when `predicate` holds for the context at run time
    pub fn enabled<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.enabled = Some(Box::new(predicate));
        self
    }

    /// Raw (uninterpolated) title
    pub fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn is_enabled(&self, ctx: &Context) -> bool {
        self.enabled.as_ref().map_or(true, |enabled| enabled(ctx))
    }

    pub(crate) fn into_action(self) -> Action {
        self.action
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("title", &self.title).finish()
    }
}

/// How the direct children of a list are executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Concurrent,
}

#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    mode: ExecutionMode,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequential(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            mode: ExecutionMode::Sequential,
        }
    }

    pub fn concurrent(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            mode: ExecutionMode::Concurrent,
        }
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn with(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Append `other` after the current tasks. A list whose mode differs from
    /// this one is kept together as a transparent group.
    pub fn append(&mut self, other: TaskList) {
        if other.is_empty() {
            return;
        }
        if other.mode == self.mode || other.len() == 1 {
            self.tasks.extend(other.tasks);
        } else {
            self.tasks.push(Task::group("", other));
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Raw titles of the direct children
    pub fn titles(&self) -> Vec<&str> {
        self.tasks.iter().map(Task::title).collect()
    }

    /// Resolve the direct children's title placeholders that `ctx` can answer
    /// now, for lists that will run under a different context than they were
    /// built for. Unresolved placeholders are left for the runner.
    pub fn render_titles(&mut self, ctx: &Context) {
        for task in &mut self.tasks {
            task.title = ctx.interpolate_known(&task.title);
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Task>, ExecutionMode) {
        (self.tasks, self.mode)
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self::sequential(iter.into_iter().collect())
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self::sequential(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(title: &str) -> Task {
        Task::new(title.to_string(), |_| async { Ok(()) })
    }

    #[test]
    fn test_append_same_mode_flattens() {
        let mut list = TaskList::sequential(vec![noop("a")]);
        list.append(TaskList::sequential(vec![noop("b"), noop("c")]));
        assert_eq!(list.titles(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_append_concurrent_into_sequential_groups() {
        let mut list = TaskList::sequential(vec![noop("a")]);
        list.append(TaskList::concurrent(vec![noop("b"), noop("c")]));
        assert_eq!(list.len(), 2);
        assert_eq!(list.titles(), vec!["a", ""]);
    }

    #[test]
    fn test_render_titles_resolves_placeholders() {
        let ctx = Context::from_iter([("symbolName", "UserController")]);
        let mut list = TaskList::sequential(vec![noop("Render {{symbolName}}"), noop("Install")]);
        list.render_titles(&ctx);
        assert_eq!(list.titles(), vec!["Render UserController", "Install"]);
    }

    #[test]
    fn test_render_titles_keeps_unresolved_placeholders() {
        let ctx = Context::from_iter([("symbolName", "UserController")]);
        let mut list = TaskList::sequential(vec![noop("Render {{symbolName}} v{{ version }}")]);
        list.render_titles(&ctx);
        assert_eq!(list.titles(), vec!["Render UserController v{{ version }}"]);
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut list = TaskList::new();
        list.append(TaskList::concurrent(vec![]));
        assert!(list.is_empty());
    }
}
