//! Answerers: whatever supplies values for questions (a terminal, a script, a test)

use crate::context::Context;
use crate::prompt::question::{Choice, Question};
use crate::prompt::source::FilteredSource;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// A question ready to be answered; autocomplete sources are already loaded
#[derive(Debug, Clone, Copy)]
pub enum Prompt<'a> {
    Input { default: Option<&'a str> },
    Confirm { default: bool },
    Select { choices: &'a [Choice], default: Option<&'a str> },
    MultiSelect { choices: &'a [Choice], defaults: &'a [String] },
    Search { source: &'a FilteredSource },
}

/// Supplies an answer for one question at a time
#[async_trait]
pub trait Answerer: Send {
    async fn answer(&mut self, question: &Question, prompt: Prompt<'_>, ctx: &Context)
        -> Result<Value>;
}

/// Non-interactive answerer: preset answers first, then defaults
#[derive(Debug, Default)]
pub struct ScriptedAnswerer {
    answers: HashMap<String, Value>,
    asked: Vec<String>,
}

impl ScriptedAnswerer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.answers.insert(name.into(), value.into());
        self
    }

    /// Names of the questions asked so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

#[async_trait]
impl Answerer for ScriptedAnswerer {
    async fn answer(
        &mut self,
        question: &Question,
        prompt: Prompt<'_>,
        _ctx: &Context,
    ) -> Result<Value> {
        self.asked.push(question.name.clone());

        if let Some(value) = self.answers.get(&question.name) {
            return Ok(value.clone());
        }

        match prompt {
            Prompt::Input { default } => Ok(Value::String(default.unwrap_or("").to_string())),
            Prompt::Confirm { default } => Ok(Value::Bool(default)),
            Prompt::Select { choices, default } => default
                .map(str::to_string)
                .or_else(|| choices.first().map(|c| c.value.clone()))
                .map(Value::String)
                .ok_or_else(|| anyhow::anyhow!("No choices available for '{}'", question.name)),
            Prompt::MultiSelect { defaults, .. } => Ok(Value::Array(
                defaults.iter().cloned().map(Value::String).collect(),
            )),
            Prompt::Search { source } => source
                .all()
                .first()
                .map(|c| Value::String(c.value.clone()))
                .ok_or_else(|| anyhow::anyhow!("No choices available for '{}'", question.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_preset_answer_wins_over_default() {
        let mut answerer = ScriptedAnswerer::new().with_answer("name", "user");
        let question = Question::input("name", "Name").default("hello");
        let value = answerer
            .answer(&question, Prompt::Input { default: Some("hello") }, &Context::new())
            .await
            .unwrap();
        assert_eq!(value, json!("user"));
        assert_eq!(answerer.asked(), &["name".to_string()]);
    }

    #[tokio::test]
    async fn test_select_falls_back_to_first_choice() {
        let mut answerer = ScriptedAnswerer::new();
        let choices = vec![Choice::new("npm", "npm"), Choice::new("yarn", "yarn")];
        let question = Question::select("pm", "Package manager", choices.clone());
        let value = answerer
            .answer(
                &question,
                Prompt::Select {
                    choices: &choices,
                    default: None,
                },
                &Context::new(),
            )
            .await
            .unwrap();
        assert_eq!(value, json!("npm"));
    }

    #[tokio::test]
    async fn test_empty_search_is_an_error() {
        let mut answerer = ScriptedAnswerer::new();
        let source = FilteredSource::default();
        let question = Question::input("pkg", "Package");
        let result = answerer
            .answer(&question, Prompt::Search { source: &source }, &Context::new())
            .await;
        assert!(result.is_err());
    }
}
