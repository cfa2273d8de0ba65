//! Task tree execution

use super::{ExecutionMode, SilentReporter, Task, TaskList, TaskOutcome, TaskReporter};
use crate::context::SharedContext;
use crate::error::CoreError;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;

/// Executes task lists against a shared context.
///
/// Sequential lists stop at the first failure. Concurrent lists let every
/// started sibling settle, then fail if any member failed.
#[derive(Clone)]
pub struct TaskRunner {
    reporter: Arc<dyn TaskReporter>,
}

impl TaskRunner {
    pub fn new(reporter: Arc<dyn TaskReporter>) -> Self {
        Self { reporter }
    }

    pub fn silent() -> Self {
        Self::new(Arc::new(SilentReporter))
    }

    pub async fn run(&self, list: TaskList, ctx: &SharedContext) -> Result<(), CoreError> {
        self.run_list(list, ctx.clone(), 0).await
    }

    fn run_list(
        &self,
        list: TaskList,
        ctx: SharedContext,
        depth: usize,
    ) -> BoxFuture<'_, Result<(), CoreError>> {
        async move {
            let (tasks, mode) = list.into_parts();
            match mode {
                ExecutionMode::Sequential => {
                    for task in tasks {
                        self.run_task(task, ctx.clone(), depth).await?;
                    }
                    Ok(())
                }
                ExecutionMode::Concurrent => {
                    let results = join_all(
                        tasks
                            .into_iter()
                            .map(|task| self.run_task(task, ctx.clone(), depth)),
                    )
                    .await;

                    let failures: Vec<CoreError> =
                        results.into_iter().filter_map(Result::err).collect();
                    if failures.is_empty() {
                        Ok(())
                    } else {
                        Err(CoreError::GroupFailed { failures })
                    }
                }
            }
        }
        .boxed()
    }

    async fn run_task(
        &self,
        task: Task,
        ctx: SharedContext,
        depth: usize,
    ) -> Result<(), CoreError> {
        let template = task.title().to_string();
        let transparent = template.is_empty();
        let (enabled, title) = {
            let guard = ctx.read().await;
            (task.is_enabled(&guard), guard.interpolate(task.title()))
        };

        if !enabled {
            tracing::debug!(task = %title, "task skipped");
            if !transparent {
                self.reporter.skipped(depth, &title);
            }
            return Ok(());
        }

        tracing::debug!(task = %title, depth, "task started");
        if !transparent {
            self.reporter.started(depth, &title);
        }

        let child_depth = if transparent { depth } else { depth + 1 };
        let action = task.into_action();
        let result = match action(ctx.clone()).await {
            Ok(TaskOutcome::Done) => Ok(()),
            Ok(TaskOutcome::Expand(list)) => self.run_list(list, ctx.clone(), child_depth).await,
            Err(source) => Err(CoreError::TaskFailed {
                title: title.clone(),
                source,
            }),
        };

        // Titles may reference values produced by the task itself
        let title = ctx.interpolate(&template).await;
        match result {
            Ok(()) => {
                tracing::debug!(task = %title, "task completed");
                if !transparent {
                    self.reporter.completed(depth, &title);
                }
                Ok(())
            }
            Err(err) => {
                tracing::debug!(task = %title, error = %err, "task failed");
                if !transparent {
                    self.reporter.failed(depth, &title, &err);
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use std::fmt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl TaskReporter for RecordingReporter {
        fn started(&self, depth: usize, title: &str) {
            self.events.lock().unwrap().push(format!("start:{}:{}", depth, title));
        }
        fn completed(&self, depth: usize, title: &str) {
            self.events.lock().unwrap().push(format!("done:{}:{}", depth, title));
        }
        fn skipped(&self, depth: usize, title: &str) {
            self.events.lock().unwrap().push(format!("skip:{}:{}", depth, title));
        }
        fn failed(&self, depth: usize, title: &str, _error: &dyn fmt::Display) {
            self.events.lock().unwrap().push(format!("fail:{}:{}", depth, title));
        }
    }

    fn counting(title: &str, counter: Arc<AtomicUsize>) -> Task {
        Task::new(title.to_string(), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn failing(title: &str) -> Task {
        Task::new(title.to_string(), |_| async { anyhow::bail!("boom") })
    }

    #[tokio::test]
    async fn test_sequential_failure_stops_remaining_tasks() {
        let first = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));
        let list = TaskList::sequential(vec![
            counting("first", first.clone()),
            failing("second"),
            counting("third", third.clone()),
        ]);

        let err = TaskRunner::silent()
            .run(list, &SharedContext::default())
            .await
            .unwrap_err();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
        assert_eq!(err.failed_title(), Some("second"));
    }

    #[tokio::test]
    async fn test_concurrent_group_settles_all_siblings() {
        let slow_a = Arc::new(AtomicBool::new(false));
        let slow_b = Arc::new(AtomicBool::new(false));

        let slow = |title: &str, flag: Arc<AtomicBool>| {
            Task::new(title.to_string(), move |_| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
        };

        let list = TaskList::concurrent(vec![
            slow("a", slow_a.clone()),
            failing("b"),
            slow("c", slow_b.clone()),
        ]);

        let err = TaskRunner::silent()
            .run(list, &SharedContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::GroupFailed { ref failures } if failures.len() == 1));
        assert!(slow_a.load(Ordering::SeqCst));
        assert!(slow_b.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_concurrent_group_keeps_order_inside_sequential_members() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let step = |title: &'static str, delay_ms: u64| {
            let order = order.clone();
            Task::new(title, move |_| async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                order.lock().unwrap().push(title);
                Ok(())
            })
        };

        let list = TaskList::concurrent(vec![
            Task::group("a", TaskList::sequential(vec![step("a1", 30), step("a2", 0)])),
            Task::group("b", TaskList::sequential(vec![step("b1", 0), step("b2", 0)])),
        ]);

        TaskRunner::silent()
            .run(list, &SharedContext::default())
            .await
            .unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["b1", "b2", "a1", "a2"]);
    }

    #[tokio::test]
    async fn test_titles_interpolated_at_run_time() {
        let reporter = Arc::new(RecordingReporter::default());
        let runner = TaskRunner::new(reporter.clone());

        let list = TaskList::sequential(vec![
            Task::new("Resolve name", |ctx: SharedContext| async move {
                ctx.set("symbolName", "UserController").await;
                Ok(())
            }),
            Task::new("Generate {{symbolName}}", |_| async { Ok(()) }),
        ]);

        runner.run(list, &SharedContext::default()).await.unwrap();

        assert_eq!(
            reporter.events(),
            vec![
                "start:0:Resolve name",
                "done:0:Resolve name",
                "start:0:Generate UserController",
                "done:0:Generate UserController",
            ]
        );
    }

    #[tokio::test]
    async fn test_expanded_list_runs_nested_with_same_context() {
        let reporter = Arc::new(RecordingReporter::default());
        let runner = TaskRunner::new(reporter.clone());
        let ctx = SharedContext::new(Context::new());
        let outer = ctx.clone();

        let list = TaskList::sequential(vec![
            Task::expand("Generate server", move |inner: SharedContext| async move {
                assert!(inner.same_as(&outer));
                Ok(TaskList::sequential(vec![Task::new(
                    "Write file",
                    |ctx: SharedContext| async move {
                        ctx.set("written", true).await;
                        Ok(())
                    },
                )]))
            }),
            Task::new("After", |_| async { Ok(()) }),
        ]);

        runner.run(list, &ctx).await.unwrap();

        assert!(ctx.read().await.flag("written"));
        assert_eq!(
            reporter.events(),
            vec![
                "start:0:Generate server",
                "start:1:Write file",
                "done:1:Write file",
                "done:0:Generate server",
                "start:0:After",
                "done:0:After",
            ]
        );
    }

    #[tokio::test]
    async fn test_nested_failure_keeps_innermost_title() {
        let list = TaskList::sequential(vec![Task::group(
            "Outer",
            TaskList::sequential(vec![failing("Inner")]),
        )]);
        let err = TaskRunner::silent()
            .run(list, &SharedContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.failed_title(), Some("Inner"));
    }

    #[tokio::test]
    async fn test_disabled_task_is_skipped() {
        let reporter = Arc::new(RecordingReporter::default());
        let counter = Arc::new(AtomicUsize::new(0));
        let list = TaskList::sequential(vec![
            counting("Install", counter.clone()).enabled(|ctx| !ctx.flag("skipInstall"))
        ]);
        let ctx = SharedContext::new(Context::new().with("skipInstall", true));

        TaskRunner::new(reporter.clone()).run(list, &ctx).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(reporter.events(), vec!["skip:0:Install"]);
    }

    #[tokio::test]
    async fn test_transparent_group_not_reported() {
        let reporter = Arc::new(RecordingReporter::default());
        let list = TaskList::sequential(vec![Task::group(
            "",
            TaskList::concurrent(vec![Task::new("x", |_| async { Ok(()) })]),
        )]);
        TaskRunner::new(reporter.clone())
            .run(list, &SharedContext::default())
            .await
            .unwrap();
        assert_eq!(reporter.events(), vec!["start:0:x", "done:0:x"]);
    }
}
