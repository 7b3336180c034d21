use anyhow::Result;
use clap::{Parser, Subcommand};
use graft::commands::pull::{PullOptions, pull};
use graft::git::GitRepo;

#[derive(Parser)]
#[command(
    name = "graft",
    version = "0.1.0",
    about = "Pull git history between repositories, transplanting it under or out of a directory prefix",
    long_about = "graft replays one repository's history into another through a path \
    rewriter: either relocated under a target directory, or narrowed down to a source \
    directory with the prefix stripped and emptied commits pruned.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "pull",
        about = "Pull history from another repository through the path rewriter"
    )]
    Pull {
        #[arg(long, help = "The repository to pull history from")]
        from: String,
        #[arg(long, default_value = ".", help = "The repository to replay history into")]
        to: String,
        #[arg(
            long,
            conflicts_with = "target_dir",
            help = "Keep only history under this directory of the source, stripping the prefix"
        )]
        source_dir: Option<String>,
        #[arg(long, help = "Replay the pulled history under this directory of the target")]
        target_dir: Option<String>,
        #[arg(
            long,
            help = "First pull into this target (merge allows unrelated histories)"
        )]
        initial: bool,
        #[arg(long, help = "Print the original and rewritten streams")]
        dump: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Pull {
            from,
            to,
            source_dir,
            target_dir,
            initial,
            dump,
        } => {
            let from = GitRepo::new(from)?;
            let to = GitRepo::new(to)?;
            let options =
                PullOptions::new(source_dir.clone(), target_dir.clone(), *initial, *dump);

            pull(&from, &to, &options).await
        }
    }
}
