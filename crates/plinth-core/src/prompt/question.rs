//! Question types contributed by commands and hooks

use crate::context::Context;
use crate::prompt::source::ChoiceSource;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Visibility predicate evaluated against the accumulated answers
pub type Predicate = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Answer post-processing applied before the value is stored
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A selectable option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Value stored in the context when selected
    pub value: String,
    /// Label shown to the user
    pub label: String,
    /// Secondary text (description)
    pub hint: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            hint: String::new(),
        }
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }
}

/// Kind of input a question expects
#[derive(Clone)]
pub enum QuestionKind {
    Input { default: Option<String> },
    Confirm { default: bool },
    Select { choices: Vec<Choice>, default: Option<String> },
    MultiSelect { choices: Vec<Choice>, defaults: Vec<String> },
    /// Choices loaded from a data source and filtered by keyword
    Autocomplete { source: Arc<dyn ChoiceSource> },
}

impl fmt::Debug for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Input { default } => f.debug_struct("Input").field("default", default).finish(),
            QuestionKind::Confirm { default } => {
                f.debug_struct("Confirm").field("default", default).finish()
            }
            QuestionKind::Select { choices, default } => f
                .debug_struct("Select")
                .field("choices", choices)
                .field("default", default)
                .finish(),
            QuestionKind::MultiSelect { choices, defaults } => f
                .debug_struct("MultiSelect")
                .field("choices", choices)
                .field("defaults", defaults)
                .finish(),
            QuestionKind::Autocomplete { .. } => f.write_str("Autocomplete"),
        }
    }
}

/// A single prompt. `name` is the context key the answer is stored under.
#[derive(Clone)]
pub struct Question {
    pub name: String,
    pub message: String,
    pub kind: QuestionKind,
    when: Option<Predicate>,
    transform: Option<Transform>,
}

impl Question {
    fn new(name: impl Into<String>, message: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            kind,
            when: None,
            transform: None,
        }
    }

    pub fn input(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, message, QuestionKind::Input { default: None })
    }

    pub fn confirm(name: impl Into<String>, message: impl Into<String>, default: bool) -> Self {
        Self::new(name, message, QuestionKind::Confirm { default })
    }

    pub fn select(
        name: impl Into<String>,
        message: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self::new(
            name,
            message,
            QuestionKind::Select {
                choices,
                default: None,
            },
        )
    }

    pub fn multiselect(
        name: impl Into<String>,
        message: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self::new(
            name,
            message,
            QuestionKind::MultiSelect {
                choices,
                defaults: Vec::new(),
            },
        )
    }

    pub fn autocomplete(
        name: impl Into<String>,
        message: impl Into<String>,
        source: Arc<dyn ChoiceSource>,
    ) -> Self {
        Self::new(name, message, QuestionKind::Autocomplete { source })
    }

    /// Default answer. Applies to input and select questions; for multi-select
    /// it pre-selects one more value.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        match &mut self.kind {
            QuestionKind::Input { default } | QuestionKind::Select { default, .. } => {
                *default = Some(value)
            }
            QuestionKind::MultiSelect { defaults, .. } => defaults.push(value),
            QuestionKind::Confirm { .. } | QuestionKind::Autocomplete { .. } => {}
        }
        self
    }

    /// Only ask when `predicate` holds for the answers collected so far
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Arc::new(predicate));
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn is_visible(&self, ctx: &Context) -> bool {
        self.when.as_ref().map_or(true, |when| when(ctx))
    }

    pub fn apply_transform(&self, value: Value) -> Value {
        match &self.transform {
            Some(transform) => transform(value),
            None => value,
        }
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("kind", &self.kind)
            .field("when", &self.when.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_when_gates_on_context() {
        let question = Question::input("passportPackage", "Which passport package?")
            .when(|ctx| ctx.get_str("type") == Some("protocol"));

        let controller = Context::from_value(json!({"type": "controller"}));
        let protocol = Context::from_value(json!({"type": "protocol"}));
        assert!(!question.is_visible(&controller));
        assert!(question.is_visible(&protocol));
    }

    #[test]
    fn test_default_per_kind() {
        let q = Question::select("pm", "Package manager", vec![Choice::new("npm", "npm")])
            .default("npm");
        assert!(matches!(q.kind, QuestionKind::Select { default: Some(ref d), .. } if d == "npm"));

        let q = Question::multiselect("features", "Features", vec![]).default("swagger");
        assert!(matches!(q.kind, QuestionKind::MultiSelect { ref defaults, .. } if defaults == &["swagger"]));
    }

    #[test]
    fn test_transform_applied() {
        let q = Question::input("name", "Name").transform(|v| json!(v.as_str().unwrap_or("").trim()));
        assert_eq!(q.apply_transform(json!("  user ")), json!("user"));
    }
}
