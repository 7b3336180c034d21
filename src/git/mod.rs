//! Process gateway to the git binary
//!
//! Every interaction with an actual repository goes through [`GitRepo`],
//! which pins a working directory and runs git subcommands in it. The
//! stream core never touches a process; it sees text going in and out of
//! this module.
//!
//! Three shapes of invocation: inherit the terminal (`git`), capture
//! output (`git_capture`), and feed stdin while tolerating an explicit set
//! of exit codes (`git_with_input`) — fast-import signals the interesting
//! "new tip" condition through stderr text with exit code 1.

use anyhow::{Context, bail};
use derive_new::new;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Captured result of one git invocation.
#[derive(Debug, Clone, new)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

/// Handle on one git working directory.
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    pub fn new(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path
            .as_ref()
            .canonicalize()
            .with_context(|| format!("no such repository path {:?}", path.as_ref()))?;
        Ok(GitRepo { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a git subcommand with inherited stdio, e.g. `git(&["fetch", url])`.
    pub async fn git(&self, args: &[&str]) -> anyhow::Result<()> {
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .status()
            .await
            .with_context(|| format!("failed to spawn git {args:?}"))?;

        if !status.success() {
            bail!("git {:?} returned {}", args, status);
        }
        Ok(())
    }

    /// Run a git subcommand and capture stdout/stderr. Non-zero exit is an
    /// error carrying both streams.
    pub async fn git_capture(&self, args: &[&str]) -> anyhow::Result<CommandOutput> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to spawn git {args:?}"))?;

        let output = CommandOutput::new(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code().unwrap_or(-1),
        );

        if output.code != 0 {
            bail!(
                "git {:?} returned {}, out was {:?}, err was {:?}",
                args,
                output.code,
                output.stdout,
                output.stderr
            );
        }
        Ok(output)
    }

    /// Run a git subcommand with `input` piped to stdin, capturing output.
    /// Any exit code in `allowed_codes` is accepted.
    pub async fn git_with_input(
        &self,
        args: &[&str],
        input: &str,
        allowed_codes: &[i32],
    ) -> anyhow::Result<CommandOutput> {
        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn git {args:?}"))?;

        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("no stdin handle for git {args:?}"))?;
        stdin.write_all(input.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        let output = CommandOutput::new(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code().unwrap_or(-1),
        );

        if !allowed_codes.contains(&output.code) {
            bail!(
                "git {:?} returned {}, output was {:?} / {:?}",
                args,
                output.code,
                output.stdout,
                output.stderr
            );
        }
        Ok(output)
    }
}
