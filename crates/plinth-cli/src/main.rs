//! Plinth CLI - plugin-driven project scaffolding

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use plinth_cli::{commands, plugins, PlinthConfig, WorkspaceOptions, CLI_VERSION};
use plinth_core::task::{ConsoleReporter, TaskReporter};
use plinth_core::tui::{self, CliclackAnswerer, CliclackReporter};
use plinth_core::{Answerer, Context, PackageManager, ScriptedAnswerer, TaskRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plinth")]
#[command(about = "Scaffold projects and generate code from plugin-provided generators")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Local directory with template overrides
    #[arg(long = "template-dir", global = true)]
    pub template_dir: Option<PathBuf>,

    /// Do not contact the package registry
    #[arg(long, global = true)]
    pub offline: bool,

    /// Accept defaults for every question (non-interactive mode)
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Print debug diagnostics (PLINTH_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    Init(InitArgs),
    /// Generate a controller, service, server, model, middleware or protocol
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// List the registered providers and the plugins owning them
    List,
}

#[derive(Parser, Debug, Default)]
pub struct InitArgs {
    /// Project directory to create, relative to the root
    pub directory: Option<PathBuf>,

    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Features to enable (comma-separated: swagger,testing,linter)
    #[arg(short, long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Package manager (npm, yarn, pnpm, bun)
    #[arg(long = "package-manager")]
    pub package_manager: Option<PackageManager>,

    /// Write package.json without installing dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Type to generate (see `plinth list`)
    #[arg(value_name = "TYPE")]
    pub kind: Option<String>,

    /// Name of the generated symbol
    pub name: Option<String>,

    /// Route for controllers
    #[arg(long)]
    pub route: Option<String>,

    /// Passport strategy package for protocols
    #[arg(long)]
    pub strategy: Option<String>,

    /// Write package.json without installing dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,
}

impl InitArgs {
    fn input(&self) -> Context {
        let mut ctx = Context::new();
        if let Some(name) = &self.name {
            ctx.set("projectName", name.clone());
        }
        if let Some(features) = &self.features {
            ctx.set("features", features.clone());
        }
        if let Some(pm) = self.package_manager {
            ctx.set("packageManager", pm.binary());
        }
        ctx
    }
}

impl GenerateArgs {
    fn input(&self) -> Context {
        let mut ctx = Context::new();
        if let Some(kind) = &self.kind {
            ctx.set(plinth_core::TYPE_KEY, kind.clone());
        }
        if let Some(name) = &self.name {
            ctx.set("name", name.clone());
        }
        if let Some(route) = &self.route {
            ctx.set("route", route.clone());
        }
        if let Some(strategy) = &self.strategy {
            ctx.set("passportPackage", strategy.clone());
        }
        ctx
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PLINTH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn absolute(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn list_providers() {
    let host = plugins::host();

    println!("{}", "Registered providers".cyan().bold());
    println!();
    for info in host.providers().list_all() {
        println!(
            "  {:<12} {} {}",
            info.value.green(),
            info.name,
            format!("({})", info.owner).dimmed()
        );
    }
}

async fn execute(
    args: &Args,
    command: &str,
    root: PathBuf,
    input: Context,
    skip_install: bool,
) -> Result<()> {
    let product = PlinthConfig;
    let cwd = std::env::current_dir()?;

    tui::intro(&product, command)?;

    let options = WorkspaceOptions {
        template_dir: args.template_dir.clone().map(|dir| absolute(&cwd, dir)),
        offline: args.offline,
        skip_install,
    };
    let workspace = plinth_cli::open_workspace(&product, &root, &options).await?;
    tui::warn_version(
        &product,
        CLI_VERSION,
        workspace.config().min_cli_version.as_deref(),
    )?;

    // Non-interactive runs print plain lines instead of cliclack steps
    let reporter: Arc<dyn TaskReporter> = if args.yes {
        Arc::new(ConsoleReporter)
    } else {
        Arc::new(CliclackReporter)
    };
    let controller = plinth_cli::controller(workspace, TaskRunner::new(reporter));

    let mut answerer: Box<dyn Answerer> = if args.yes {
        Box::new(ScriptedAnswerer::new())
    } else {
        Box::new(CliclackAnswerer::new())
    };

    let outcome = match controller.run(command, input, answerer.as_mut()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tui::outro_failed(format!("{} failed", command))?;
            return Err(e.into());
        }
    };

    if command == commands::init::NAME {
        let package_manager = outcome
            .context
            .get_str("packageManager")
            .and_then(|pm| pm.parse().ok())
            .unwrap_or_default();
        tui::print_next_steps(&product, &root, package_manager)?;
    } else {
        tui::outro(format!(
            "Created {}",
            outcome.context.get_str("outputFile").unwrap_or("files")
        ))?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Restore the cursor on panic and Ctrl+C
    tui::install_terminal_guards();

    let args = Args::parse();
    init_tracing(args.verbose);

    let cwd = std::env::current_dir()?;
    let base = args
        .root
        .clone()
        .map(|root| absolute(&cwd, root))
        .unwrap_or(cwd);

    let result = match &args.command {
        Some(Command::Init(init)) => {
            let root = init
                .directory
                .clone()
                .map(|dir| absolute(&base, dir))
                .unwrap_or_else(|| base.clone());
            execute(&args, commands::init::NAME, root, init.input(), init.skip_install).await
        }
        Some(Command::Generate(generate)) => {
            execute(
                &args,
                commands::generate::NAME,
                base,
                generate.input(),
                generate.skip_install,
            )
            .await
        }
        Some(Command::List) => {
            list_providers();
            Ok(())
        }
        None => {
            // No subcommand provided, default to interactive init
            let init = InitArgs::default();
            execute(&args, commands::init::NAME, base, init.input(), false).await
        }
    };

    // Ensure cursor is visible on normal exit
    tui::restore_cursor();

    result
}
