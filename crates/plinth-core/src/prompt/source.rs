//! Asynchronous choice sources for autocomplete questions

use crate::context::Context;
use crate::prompt::question::Choice;
use anyhow::Result;
use async_trait::async_trait;

/// Loads the full list of choices for an autocomplete question
#[async_trait]
pub trait ChoiceSource: Send + Sync {
    async fn fetch(&self, ctx: &Context) -> Result<Vec<Choice>>;
}

/// Fixed list of choices
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    choices: Vec<Choice>,
}

impl StaticSource {
    pub fn new(choices: Vec<Choice>) -> Self {
        Self { choices }
    }
}

#[async_trait]
impl ChoiceSource for StaticSource {
    async fn fetch(&self, _ctx: &Context) -> Result<Vec<Choice>> {
        Ok(self.choices.clone())
    }
}

/// Choices fetched once, then filtered locally on every keystroke
#[derive(Debug, Clone, Default)]
pub struct FilteredSource {
    choices: Vec<Choice>,
}

impl FilteredSource {
    /// Run the initial, unfiltered fetch
    pub async fn load(source: &dyn ChoiceSource, ctx: &Context) -> Result<Self> {
        let choices = source.fetch(ctx).await?;
        Ok(Self { choices })
    }

    pub fn from_choices(choices: Vec<Choice>) -> Self {
        Self { choices }
    }

    pub fn all(&self) -> &[Choice] {
        &self.choices
    }

    /// Case-insensitive substring match on value or label. An empty keyword matches everything.
    pub fn filter(&self, keyword: &str) -> Vec<&Choice> {
        let keyword = keyword.trim().to_lowercase();
        self.choices
            .iter()
            .filter(|choice| {
                keyword.is_empty()
                    || choice.value.to_lowercase().contains(&keyword)
                    || choice.label.to_lowercase().contains(&keyword)
            })
            .collect()
    }

    pub fn find(&self, value: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChoiceSource for CountingSource {
        async fn fetch(&self, _ctx: &Context) -> Result<Vec<Choice>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                Choice::new("passport-local", "passport-local"),
                Choice::new("passport-jwt", "passport-jwt"),
                Choice::new("passport-HTTP", "passport-http"),
            ])
        }
    }

    #[tokio::test]
    async fn test_filter_without_refetch() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
        };
        let filtered = FilteredSource::load(&source, &Context::new()).await.unwrap();

        assert_eq!(filtered.filter("").len(), 3);
        assert_eq!(filtered.filter("JWT").len(), 1);
        assert_eq!(filtered.filter("http")[0].value, "passport-HTTP");
        assert!(filtered.filter("oauth").is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource::new(vec![Choice::new("a", "A")]);
        let choices = source.fetch(&Context::new()).await.unwrap();
        assert_eq!(choices.len(), 1);
    }
}
