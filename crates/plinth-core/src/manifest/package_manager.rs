//! Package manager detection and install invocation

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for a dependency install (5 minutes)
const INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Supported package managers, in detection order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub const ALL: [PackageManager; 4] = [
        PackageManager::Npm,
        PackageManager::Yarn,
        PackageManager::Pnpm,
        PackageManager::Bun,
    ];

    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    /// Lockfile written by this manager
    pub fn lockfile(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package-lock.json",
            PackageManager::Yarn => "yarn.lock",
            PackageManager::Pnpm => "pnpm-lock.yaml",
            PackageManager::Bun => "bun.lockb",
        }
    }

    /// Command line running a package.json script
    pub fn run_script(&self, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm run {}", script),
            PackageManager::Bun => format!("bun run {}", script),
            other => format!("{} {}", other.binary(), script),
        }
    }

    /// Check if the manager is installed and answers `--version`
    pub fn is_available(&self) -> bool {
        std::process::Command::new(self.binary())
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    /// Pick the manager for `root`: an existing lockfile wins, then the first
    /// manager found on PATH. Defaults to npm when nothing is detected.
    pub fn detect(root: &Path) -> Self {
        if let Some(pm) = Self::ALL
            .into_iter()
            .find(|pm| root.join(pm.lockfile()).exists())
        {
            return pm;
        }
        Self::ALL
            .into_iter()
            .find(PackageManager::is_available)
            .unwrap_or_default()
    }

    /// Run `<manager> install` in `dir`, streaming its output
    pub async fn install(&self, dir: &Path) -> Result<()> {
        let display = format!("{} install", self.binary());
        println!("{} {}", "Running:".dimmed(), display.yellow());

        let mut child = TokioCommand::new(self.binary())
            .arg("install")
            .current_dir(dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start '{}'", display))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stdout of '{}'", display))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stderr of '{}'", display))?;

        let output_task = drain_output(stdout, stderr, |stream, line| match stream {
            OutputStream::Stdout => println!("  {}", line.dimmed()),
            OutputStream::Stderr => eprintln!("  {}", line.yellow()),
        });

        if timeout(INSTALL_TIMEOUT, output_task).await.is_err() {
            let _ = child.kill().await;
            anyhow::bail!(
                "'{}' timed out after {} seconds",
                display,
                INSTALL_TIMEOUT.as_secs()
            );
        }

        match timeout(Duration::from_secs(5), child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => anyhow::bail!(
                "'{}' failed with exit code: {}",
                display,
                status.code().unwrap_or(-1)
            ),
            Ok(Err(e)) => anyhow::bail!("Failed to wait for '{}': {}", display, e),
            Err(_) => {
                let _ = child.kill().await;
                anyhow::bail!("'{}' hung after closing its output", display);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Forward every line of both streams to `sink` until both are closed
async fn drain_output<O, E, F>(stdout: O, stderr: E, mut sink: F)
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    F: FnMut(OutputStream, &str),
{
    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        tokio::select! {
            line = stdout_reader.next_line(), if stdout_open => {
                match line {
                    Ok(Some(line)) => sink(OutputStream::Stdout, &line),
                    Ok(None) => stdout_open = false,
                    Err(e) => {
                        eprintln!("{} {}", "Error reading stdout:".red(), e);
                        stdout_open = false;
                    }
                }
            }
            line = stderr_reader.next_line(), if stderr_open => {
                match line {
                    Ok(Some(line)) => sink(OutputStream::Stderr, &line),
                    Ok(None) => stderr_open = false,
                    Err(e) => {
                        eprintln!("{} {}", "Error reading stderr:".red(), e);
                        stderr_open = false;
                    }
                }
            }
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary())
    }
}

impl FromStr for PackageManager {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            "pnpm" => Ok(PackageManager::Pnpm),
            "bun" => Ok(PackageManager::Bun),
            other => anyhow::bail!(
                "Unknown package manager '{}'. Expected one of: npm, yarn, pnpm, bun",
                other
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_manager() {
        assert_eq!("Yarn".parse::<PackageManager>().unwrap(), PackageManager::Yarn);
        assert!("cargo".parse::<PackageManager>().is_err());
    }

    #[test]
    fn test_run_script_commands() {
        assert_eq!(PackageManager::Npm.run_script("start"), "npm run start");
        assert_eq!(PackageManager::Yarn.run_script("start"), "yarn start");
        assert_eq!(PackageManager::Pnpm.run_script("test"), "pnpm test");
    }

    #[tokio::test]
    async fn test_drain_output_reads_stderr_after_stdout_closes() {
        let stdout: &[u8] = b"";
        let stderr: &[u8] = b"warn deprecated a\nwarn deprecated b\nwarn deprecated c\n";
        let mut lines = Vec::new();

        drain_output(stdout, stderr, |stream, line| lines.push((stream, line.to_string()))).await;

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|(stream, _)| *stream == OutputStream::Stderr));
        assert_eq!(lines[2].1, "warn deprecated c");
    }

    #[test]
    fn test_detect_prefers_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Pnpm);
    }
}
