//! Plinth product configuration

use plinth_core::{PackageManager, ProductConfig};
use std::path::Path;

/// CLI version, checked against a project's `min_cli_version`
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct PlinthConfig;

impl ProductConfig for PlinthConfig {
    fn name(&self) -> &'static str {
        "plinth"
    }

    fn display_name(&self) -> &'static str {
        "Plinth"
    }

    fn config_file_name(&self) -> &'static str {
        ".plinthrc.yaml"
    }

    fn default_registry_url(&self) -> &'static str {
        "https://registry.npmjs.org"
    }

    fn registry_url_env(&self) -> &'static str {
        "PLINTH_REGISTRY_URL"
    }

    fn package_manager_env(&self) -> &'static str {
        "PLINTH_PACKAGE_MANAGER"
    }

    fn docs_url(&self) -> &'static str {
        "https://github.com/plinth-dev/plinth#readme"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install plinth-cli --force"
    }

    fn next_steps(&self, dir: &Path, package_manager: PackageManager) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }
        steps.push(package_manager.run_script("dev"));
        steps.push("plinth generate controller <name>".to_string());

        steps
    }
}
