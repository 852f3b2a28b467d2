use std::path::{Path, PathBuf};
use std::process::Output;

use log::{debug, error, info, warn};
use tokio::process::Command;

use crate::errors::GitError;

// @module: Plan repository synchronisation through the git CLI

const BRANCH: &str = "main";

/// Default commit message for plan updates
pub const DEFAULT_COMMIT_MESSAGE: &str = "Automated update";

/// Keeps the plan directory in sync with a GitHub repository
#[derive(Debug, Clone)]
pub struct GitManager {
    repo_name: String,
    repo_dir: PathBuf,
    remote_url: String,
}

/// Authenticated HTTPS remote for a GitHub repository
pub fn remote_url(user: &str, token: &str, repo_name: &str) -> String {
    format!("https://{}:{}@github.com/{}/{}.git", user, token, user, repo_name)
}

impl GitManager {
    pub fn new<P: AsRef<Path>>(user: &str, token: &str, repo_name: &str, repo_dir: P) -> Self {
        Self {
            repo_name: repo_name.to_string(),
            repo_dir: repo_dir.as_ref().to_path_buf(),
            remote_url: remote_url(user, token, repo_name),
        }
    }

    /// Pull an existing checkout or clone a fresh one
    pub async fn initialize_repo(&self) -> Result<(), GitError> {
        if self.repo_dir.join(".git").exists() {
            info!("Repository found in {:?}, pulling", self.repo_dir);
            if let Err(e) = self.run_git(&["pull", "origin", BRANCH]).await {
                warn!("Git pull failed, remote branch may be missing: {}", e);
            }
            return Ok(());
        }

        info!("Repository not found, cloning {}", self.repo_name);
        if let Some(parent) = self.repo_dir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let output = Command::new("git")
            .arg("clone")
            .arg(&self.remote_url)
            .arg(&self.repo_dir)
            .output()
            .await?;

        if let Err(e) = check_output("clone", output) {
            error!("Git clone failed: {}", e);
            return Err(e);
        }

        info!("Git clone successful");
        Ok(())
    }

    /// Commit and push everything in the checkout; errors are only logged
    pub async fn push_changes(&self, message: &str) {
        if let Err(e) = self.try_push(message).await {
            error!("Git push error: {}", e);
        }
    }

    async fn try_push(&self, message: &str) -> Result<(), GitError> {
        self.run_git(&["remote", "set-url", "origin", &self.remote_url]).await?;

        let status = self.run_git(&["status", "--porcelain"]).await?;
        if String::from_utf8_lossy(&status.stdout).trim().is_empty() {
            debug!("No changes to push");
            return Ok(());
        }

        self.run_git(&["add", "."]).await?;
        self.run_git(&["commit", "-m", message]).await?;
        self.run_git(&["push", "origin", BRANCH]).await?;
        info!("Git push successful");
        Ok(())
    }

    async fn run_git(&self, args: &[&str]) -> Result<Output, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await?;
        check_output(args.first().copied().unwrap_or_default(), output)
    }
}

fn check_output(command: &str, output: Output) -> Result<Output, GitError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(GitError::CommandFailed {
            command: command.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
