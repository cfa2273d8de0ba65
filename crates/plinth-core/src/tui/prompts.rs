//! cliclack-backed answerer, task reporter and session helpers

use crate::context::Context;
use crate::manifest::PackageManager;
use crate::product::ProductConfig;
use crate::prompt::{Answerer, Prompt, Question};
use crate::task::TaskReporter;
use crate::version;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Asks every question in the terminal
#[derive(Debug, Default)]
pub struct CliclackAnswerer;

impl CliclackAnswerer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Answerer for CliclackAnswerer {
    async fn answer(
        &mut self,
        question: &Question,
        prompt: Prompt<'_>,
        _ctx: &Context,
    ) -> Result<Value> {
        let message = question.message.as_str();

        match prompt {
            Prompt::Input { default } => {
                let mut input = cliclack::input(message);
                if let Some(default) = default {
                    input = input.default_input(default).placeholder(default);
                }
                let value: String = input.interact()?;
                Ok(Value::String(value))
            }
            Prompt::Confirm { default } => {
                let value: bool = cliclack::confirm(message).initial_value(default).interact()?;
                Ok(Value::Bool(value))
            }
            Prompt::Select { choices, default } => {
                if choices.is_empty() {
                    anyhow::bail!("No choices available for '{}'", question.name);
                }
                let mut select = cliclack::select(message);
                for choice in choices {
                    select = select.item(choice.value.clone(), &choice.label, &choice.hint);
                }
                if let Some(default) = default {
                    select = select.initial_value(default.to_string());
                }
                let value: String = select.interact()?;
                Ok(Value::String(value))
            }
            Prompt::MultiSelect { choices, defaults } => {
                let mut multi = cliclack::multiselect(message);
                for choice in choices {
                    multi = multi.item(choice.value.clone(), &choice.label, &choice.hint);
                }
                let selected: Vec<String> = multi
                    .initial_values(defaults.to_vec())
                    .required(false)
                    .interact()?;
                Ok(Value::Array(selected.into_iter().map(Value::String).collect()))
            }
            Prompt::Search { source } => {
                if source.all().is_empty() {
                    anyhow::bail!("No choices available for '{}'", question.name);
                }
                // Choices are loaded once; each keyword only filters them locally
                loop {
                    let keyword: String = cliclack::input(format!("{} (search)", message))
                        .placeholder("type to filter, empty for all")
                        .required(false)
                        .interact()?;

                    let matches = source.filter(&keyword);
                    if matches.is_empty() {
                        cliclack::log::warning(format!("No matches for '{}'", keyword))?;
                        continue;
                    }

                    let mut select = cliclack::select(message);
                    for choice in matches {
                        select = select.item(choice.value.clone(), &choice.label, &choice.hint);
                    }
                    let value: String = select.interact()?;
                    return Ok(Value::String(value));
                }
            }
        }
    }
}

/// Reports task progress as cliclack log lines, indented by nesting depth
#[derive(Debug, Default)]
pub struct CliclackReporter;

impl CliclackReporter {
    fn indent(depth: usize, title: &str) -> String {
        format!("{}{}", "  ".repeat(depth), title)
    }
}

impl TaskReporter for CliclackReporter {
    fn started(&self, depth: usize, title: &str) {
        let _ = cliclack::log::step(Self::indent(depth, title));
    }

    fn completed(&self, depth: usize, title: &str) {
        let _ = cliclack::log::success(Self::indent(depth, title));
    }

    fn skipped(&self, depth: usize, title: &str) {
        let _ = cliclack::log::remark(Self::indent(depth, &format!("{} (skipped)", title)));
    }

    fn failed(&self, depth: usize, title: &str, error: &dyn fmt::Display) {
        let _ = cliclack::log::error(Self::indent(depth, &format!("{}: {}", title, error)));
    }
}

/// Restore the cursor on panic and exit with 130 on Ctrl+C
pub fn install_terminal_guards() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_cursor();
        default_panic(info);
    }));

    ctrlc::set_handler(move || {
        restore_cursor();
        std::process::exit(130);
    })
    .ok();
}

pub fn restore_cursor() {
    let _ = console::Term::stderr().show_cursor();
}

pub fn intro<C: ProductConfig>(product: &C, command: &str) -> Result<()> {
    cliclack::intro(format!("{} {}", product.display_name(), command))?;
    Ok(())
}

pub fn outro(message: impl fmt::Display) -> Result<()> {
    cliclack::outro(message)?;
    Ok(())
}

pub fn outro_failed(message: impl fmt::Display) -> Result<()> {
    cliclack::outro_cancel(message)?;
    Ok(())
}

/// Warn when the project asks for a newer CLI than the one running
pub fn warn_version<C: ProductConfig>(
    product: &C,
    cli_version: &str,
    required: Option<&str>,
) -> Result<()> {
    if let Some(required) = required {
        if let Some(warning) =
            version::check_compatibility(cli_version, required, product.upgrade_command())
        {
            cliclack::log::warning(format!(
                "Version warning: {}",
                warning.lines().next().unwrap_or(&warning)
            ))?;
        }
    }
    Ok(())
}

pub fn print_next_steps<C: ProductConfig>(
    product: &C,
    project_dir: &Path,
    package_manager: PackageManager,
) -> Result<()> {
    let steps = product.next_steps(project_dir, package_manager);

    if !steps.is_empty() {
        println!();
        println!("  Next steps");
        println!();

        for (i, step) in steps.iter().enumerate() {
            println!("  {}.  {}", i + 1, step);
        }
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}
