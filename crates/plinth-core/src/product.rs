//! Product configuration trait for CLI binaries
//!
//! The engine is product-agnostic. A binary implements this trait to name
//! itself, locate its project config file and its package registry.

use crate::manifest::PackageManager;
use std::path::Path;

/// Configuration trait for CLI products built on the engine
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// File name of the per-project configuration, looked up in the project root
    fn config_file_name(&self) -> &'static str;

    /// Default URL of the package registry
    fn default_registry_url(&self) -> &'static str;

    /// Environment variable name for overriding the registry URL
    fn registry_url_env(&self) -> &'static str;

    /// Environment variable name for forcing a package manager
    fn package_manager_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, package_manager: PackageManager) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
