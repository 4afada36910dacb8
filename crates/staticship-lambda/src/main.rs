mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "staticship",
    about = "Build a static site export and publish it to S3 or Amplify Hosting"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone, build, zip, and deploy through Amplify Hosting
    ArchiveDeploy(InvokeArgs),
    /// Clone, build, and copy the export file by file into an S3 bucket
    DirectorySync(InvokeArgs),
    /// Show the object key and content type each file would be synced with
    Plan {
        /// Directory to enumerate
        dir: PathBuf,
        /// Object key prefix
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[derive(Args)]
struct InvokeArgs {
    /// Invocation event JSON file (an empty event when omitted)
    #[arg(long)]
    event: Option<PathBuf>,
    /// Scratch directory to clone and build in; its contents are deleted first
    #[arg(long)]
    scratch_root: Option<PathBuf>,
    /// Build settings file
    #[arg(long, default_value = "staticship.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    staticship_lambda::telemetry::init_cli();

    let dotenv_loaded = dotenvy::dotenv().is_ok();
    tracing::debug!(dotenv = dotenv_loaded, "environment loaded");

    let cli = Cli::parse();

    match cli.command {
        Commands::ArchiveDeploy(args) => {
            commands::archive_deploy(args.event, args.scratch_root, &args.config).await?
        }
        Commands::DirectorySync(args) => {
            commands::directory_sync(args.event, args.scratch_root, &args.config).await?
        }
        Commands::Plan { dir, prefix } => commands::plan(dir, prefix.as_deref()).await?,
    }

    Ok(())
}
