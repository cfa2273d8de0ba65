//! Version comparison for CLI and project compatibility

use anyhow::Result;
use semver::Version;

/// Compare the running CLI version against the minimum a project asks for.
/// Returns a warning message if the CLI is older.
pub fn check_compatibility(
    cli_version: &str,
    required_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version).ok()?;
    let required_ver = parse_version(required_version).ok()?;

    if cli_ver < required_ver {
        Some(format!(
            "This project requires CLI version {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            required_version, cli_version, upgrade_command
        ))
    } else {
        None
    }
}

/// Parse version string, tolerating a leading 'v'
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_older_than_required() {
        let warning = check_compatibility("0.1.0", "0.2.0", "cargo install plinth-cli --force");
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_as_required() {
        assert!(check_compatibility("0.1.0", "0.1.0", "upgrade").is_none());
    }

    #[test]
    fn test_cli_newer_than_required() {
        assert!(check_compatibility("0.2.0", "v0.1.0", "upgrade").is_none());
    }

    #[test]
    fn test_invalid_versions() {
        // Should return None (no warning) for invalid versions
        assert!(check_compatibility("invalid", "0.1.0", "upgrade").is_none());
    }

    #[test]
    fn test_parse_version_strips_prefix() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert!(parse_version("latest").is_err());
    }
}
