//! Prompt resolution
//!
//! Questions from the command and from every hook are resolved as one form.
//! Each question is checked against the answers gathered so far, so later
//! questions can depend on earlier ones.

pub mod answer;
pub mod question;
pub mod source;

use crate::context::Context;
use crate::error::CoreError;

pub use answer::{Answerer, Prompt, ScriptedAnswerer};
pub use question::{Choice, Predicate, Question, QuestionKind, Transform};
pub use source::{ChoiceSource, FilteredSource, StaticSource};

/// Resolve `questions` in order, merging each answer into `ctx` as it arrives.
///
/// Questions whose key is already set (e.g. from command-line flags) are not
/// asked, but their transform still applies to the given value. A failing
/// autocomplete source aborts the whole form.
pub async fn resolve(
    questions: &[Question],
    mut ctx: Context,
    answerer: &mut dyn Answerer,
) -> Result<Context, CoreError> {
    for question in questions {
        if let Some(given) = ctx.remove(&question.name) {
            tracing::debug!(question = %question.name, "already answered, skipping");
            ctx.set(question.name.clone(), question.apply_transform(given));
            continue;
        }
        if !question.is_visible(&ctx) {
            tracing::debug!(question = %question.name, "hidden by predicate");
            continue;
        }

        let value = ask(question, &ctx, answerer).await?;
        let value = question.apply_transform(value);
        ctx.set(question.name.clone(), value);
    }

    Ok(ctx)
}

async fn ask(
    question: &Question,
    ctx: &Context,
    answerer: &mut dyn Answerer,
) -> Result<serde_json::Value, CoreError> {
    let prompt_error = |source: anyhow::Error| CoreError::Prompt {
        question: question.name.clone(),
        source,
    };

    match &question.kind {
        QuestionKind::Input { default } => answerer
            .answer(
                question,
                Prompt::Input {
                    default: default.as_deref(),
                },
                ctx,
            )
            .await
            .map_err(prompt_error),
        QuestionKind::Confirm { default } => answerer
            .answer(question, Prompt::Confirm { default: *default }, ctx)
            .await
            .map_err(prompt_error),
        QuestionKind::Select { choices, default } => answerer
            .answer(
                question,
                Prompt::Select {
                    choices,
                    default: default.as_deref(),
                },
                ctx,
            )
            .await
            .map_err(prompt_error),
        QuestionKind::MultiSelect { choices, defaults } => answerer
            .answer(question, Prompt::MultiSelect { choices, defaults }, ctx)
            .await
            .map_err(prompt_error),
        QuestionKind::Autocomplete { source } => {
            let loaded = FilteredSource::load(source.as_ref(), ctx)
                .await
                .map_err(|source| CoreError::PromptDataFetch {
                    question: question.name.clone(),
                    source,
                })?;
            answerer
                .answer(question, Prompt::Search { source: &loaded }, ctx)
                .await
                .map_err(prompt_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct FailingSource;

    #[async_trait]
    impl ChoiceSource for FailingSource {
        async fn fetch(&self, _ctx: &Context) -> anyhow::Result<Vec<Choice>> {
            anyhow::bail!("registry unreachable")
        }
    }

    #[tokio::test]
    async fn test_gated_question_excluded() {
        let questions = vec![Question::input("passportPackage", "Which package?")
            .when(|ctx| ctx.get_str("type") == Some("protocol"))];
        let mut answerer = ScriptedAnswerer::new().with_answer("passportPackage", "p1");

        let ctx = resolve(
            &questions,
            Context::from_value(json!({"type": "controller"})),
            &mut answerer,
        )
        .await
        .unwrap();

        assert!(!ctx.contains("passportPackage"));
        assert!(answerer.asked().is_empty());
    }

    #[tokio::test]
    async fn test_later_question_sees_earlier_answer() {
        let questions = vec![
            Question::select(
                "type",
                "Type",
                vec![Choice::new("controller", "Controller"), Choice::new("protocol", "Protocol")],
            ),
            Question::input("passportPackage", "Which package?")
                .when(|ctx| ctx.get_str("type") == Some("protocol")),
        ];
        let mut answerer = ScriptedAnswerer::new()
            .with_answer("type", "protocol")
            .with_answer("passportPackage", "passport-local");

        let ctx = resolve(&questions, Context::new(), &mut answerer).await.unwrap();

        assert_eq!(ctx.get_str("passportPackage"), Some("passport-local"));
        assert_eq!(answerer.asked(), &["type".to_string(), "passportPackage".to_string()]);
    }

    #[tokio::test]
    async fn test_prefilled_keys_are_not_asked() {
        let questions = vec![Question::input("name", "Name").default("x")];
        let mut answerer = ScriptedAnswerer::new();
        let ctx = resolve(
            &questions,
            Context::new().with("name", "given"),
            &mut answerer,
        )
        .await
        .unwrap();
        assert_eq!(ctx.get_str("name"), Some("given"));
        assert!(answerer.asked().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let questions = vec![
            Question::autocomplete("pkg", "Package", Arc::new(FailingSource)),
            Question::input("after", "After"),
        ];
        let mut answerer = ScriptedAnswerer::new();
        let err = resolve(&questions, Context::new(), &mut answerer)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PromptDataFetch { ref question, .. } if question == "pkg"));
        assert!(answerer.asked().is_empty());
    }

    #[tokio::test]
    async fn test_transform_result_stored() {
        let questions = vec![Question::input("name", "Name")
            .transform(|v| json!(v.as_str().unwrap_or_default().to_uppercase()))];
        let mut answerer = ScriptedAnswerer::new().with_answer("name", "abc");
        let ctx = resolve(&questions, Context::new(), &mut answerer).await.unwrap();
        assert_eq!(ctx.get_str("name"), Some("ABC"));
    }

    #[tokio::test]
    async fn test_transform_applies_to_prefilled_value() {
        let questions = vec![Question::input("name", "Name")
            .transform(|v| json!(v.as_str().unwrap_or_default().trim().to_string()))];
        let mut answerer = ScriptedAnswerer::new();
        let ctx = resolve(
            &questions,
            Context::new().with("name", "  billing  "),
            &mut answerer,
        )
        .await
        .unwrap();
        assert_eq!(ctx.get_str("name"), Some("billing"));
        assert!(answerer.asked().is_empty());
    }
}
