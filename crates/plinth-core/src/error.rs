//! Error taxonomy for the lifecycle engine
//!
//! Plugin callbacks and collaborators return `anyhow::Result`; the engine wraps
//! those failures into [`CoreError`] so callers can tell a wiring bug
//! (unknown provider) from a failing task or a failing prompt source.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the provider registry, prompt resolver and task runner
#[derive(Debug, Error)]
pub enum CoreError {
    /// Ownership query or dispatch on a provider value nobody registered
    #[error("Unknown provider '{value}'. Registered providers: {registered}")]
    UnknownProvider { value: String, registered: String },

    /// A data source behind an interactive question failed
    #[error("Failed to load choices for question '{question}'")]
    PromptDataFetch {
        question: String,
        #[source]
        source: anyhow::Error,
    },

    /// The answerer could not produce a value for a question
    #[error("Prompt '{question}' failed")]
    Prompt {
        question: String,
        #[source]
        source: anyhow::Error,
    },

    /// A task action failed; `title` is the interpolated title of the failing task
    #[error("Task '{title}' failed: {source:#}")]
    TaskFailed {
        title: String,
        #[source]
        source: anyhow::Error,
    },

    /// One or more members of a concurrent group failed
    #[error("{} of the concurrent tasks failed: {}", failures.len(), summarize(failures))]
    GroupFailed { failures: Vec<CoreError> },

    /// A hook callback failed while contributing questions or tasks
    #[error("Hook '{hook}' failed during '{command}'")]
    Hook {
        hook: String,
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// A command's context mapping rejected the collected answers
    #[error("Invalid context for '{command}': {message}")]
    InvalidContext { command: String, message: String },

    /// No command with this name was registered on the controller
    #[error("Unknown command '{name}'. Available commands: {available}")]
    UnknownCommand { name: String, available: String },

    /// A command's own pre-exec or task callback failed
    #[error("Command '{command}' failed while building {phase} tasks")]
    Command {
        command: String,
        phase: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to update package manifest {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to render template '{template}'")]
    Template {
        template: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid configuration in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Package registry request failed")]
    Registry(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Title of the innermost failing task, if this error came from the runner
    pub fn failed_title(&self) -> Option<&str> {
        match self {
            CoreError::TaskFailed { title, .. } => Some(title),
            CoreError::GroupFailed { failures } => failures.first().and_then(|f| f.failed_title()),
            _ => None,
        }
    }
}

fn summarize(failures: &[CoreError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CoreError>;
