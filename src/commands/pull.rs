//! Pull history from one repository into another
//!
//! The flow mirrors what you would do by hand: fetch, `fast-export` the
//! source's main branch without blob data, rewrite the stream, replay it
//! with `fast-import`, then merge the tip the importer reported. The tip
//! arrives as status text on stderr — fast-import deliberately refuses to
//! move `refs/heads/main` when the replayed history does not contain its
//! current tip, and prints the new tip in a warning instead.

use crate::git::GitRepo;
use crate::rewrite::Rewrite;
use anyhow::{Context, bail};
use colored::Colorize;
use derive_new::new;

/// What fast-import prints when the replayed history diverges from the
/// current branch tip (source-dir pulls, where history shrinks).
const DIVERGED_TIP_REGEX: &str =
    r"warning: Not updating refs/heads/main \(new tip (\S+) does not contain";

/// The tip report on a clean replay.
const NEW_TIP_REGEX: &str = r"new tip (\S+)";

#[derive(Debug, Default, new)]
pub struct PullOptions {
    /// Keep only history under this source directory, stripping the prefix.
    pub source_dir: Option<String>,
    /// Replay history relocated under this target directory.
    pub target_dir: Option<String>,
    /// First pull into this target: merge with unrelated histories allowed.
    pub initial: bool,
    /// Print the original and rewritten streams.
    pub dump: bool,
}

pub async fn pull(from: &GitRepo, to: &GitRepo, options: &PullOptions) -> anyhow::Result<()> {
    if options.source_dir.is_some() && options.target_dir.is_some() {
        bail!("source-dir and target-dir are mutually exclusive options");
    }

    let from_path = from.path().to_string_lossy();
    to.git(&["fetch", from_path.as_ref()]).await?;

    if options.source_dir.is_some() {
        let status = to.git_capture(&["status", "--porcelain"]).await?;
        if !status.stdout.is_empty() {
            bail!("target git working directory must be clean");
        }
    }

    let export = from
        .git_capture(&["fast-export", "--no-data", "main"])
        .await?
        .stdout;
    if options.dump {
        println!("{}", "Original fast export".bold());
        println!("{export}");
    }

    let mut rewriter = Rewrite::parse(&export)?;
    let rewritten = rewriter.rewrite_paths(
        options.target_dir.as_deref(),
        options.source_dir.as_deref(),
    )?;
    if options.dump {
        println!("{}", "Rewritten".bold());
        println!("{rewritten}");
    }

    let import = to
        .git_with_input(&["fast-import"], &rewritten, &[0, 1])
        .await
        .context("fast-import failed")?;
    if options.dump {
        println!("{import:?}");
    }

    if let Some(source_dir) = &options.source_dir {
        let diverged = regex::Regex::new(DIVERGED_TIP_REGEX)?;
        if let Some(caps) = diverged.captures(&import.stderr) {
            let tip = caps
                .get(1)
                .map(|m| m.as_str())
                .context("malformed fast-import tip warning")?;
            let message = format!("Merge upstream {source_dir}");
            to.git(&["merge", "-m", message.as_str(), tip]).await?;
        }
        // fast-import bypasses the index; realign the working tree.
        to.git(&["reset", "--hard"]).await?;
    } else if let Some(target_dir) = &options.target_dir {
        let caps = regex::Regex::new(NEW_TIP_REGEX)?
            .captures(&import.stderr)
            .context("fast-import did not return a new tip")?;
        let tip = caps
            .get(1)
            .map(|m| m.as_str())
            .context("malformed fast-import tip report")?;

        let message = format!("Merge {target_dir}");
        let mut merge = vec!["merge", "-m", message.as_str(), tip];
        if options.initial {
            merge.insert(1, "--allow-unrelated-histories");
        }
        to.git(&merge).await?;
    }

    Ok(())
}
