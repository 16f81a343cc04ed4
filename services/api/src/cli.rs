use crate::commands::{
    run_delete, run_detect, run_explain, run_import, run_list, run_recalculate, run_reference,
    ImportArgs, ListArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use swipe_engine::config::{AppConfig, StorageConfig};
use swipe_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Swipe Engine",
    about = "Score, explain, and curate a swipe file of observed ads",
    version
)]
struct Cli {
    /// Override the configured ad store (APP_ADS_PATH)
    #[arg(long, global = true)]
    ads_path: Option<PathBuf>,
    /// JSON rule book replacing the built-in trigger tables (APP_RULES_PATH)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect and curate the stored ad corpus
    Ads {
        #[command(subcommand)]
        command: AdsCommand,
    },
    /// Detect fields and compliance alerts in free text without storing it
    Detect {
        /// Ad copy to analyze
        text: String,
    },
}

#[derive(Subcommand, Debug)]
enum AdsCommand {
    /// List stored ads with their scores
    List(ListArgs),
    /// Bulk import ads from a CSV export or JSON file
    Import(ImportArgs),
    /// Re-detect fields and rescore every stored ad
    Recalculate,
    /// Show the score components for one ad
    Explain { id: String },
    /// Delete one ad
    Delete { id: String },
    /// Toggle the reference flag on one ad
    Reference { id: String },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(path) = cli.ads_path {
        config.storage.ads_path = path;
    }
    if let Some(path) = cli.rules {
        config.storage.rules_path = Some(path);
    }

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Ads { command } => run_ads(&config.storage, command),
        Command::Detect { text } => run_detect(&config.storage, text),
    }
}

fn run_ads(storage: &StorageConfig, command: AdsCommand) -> Result<(), AppError> {
    match command {
        AdsCommand::List(args) => run_list(storage, args),
        AdsCommand::Import(args) => run_import(storage, args),
        AdsCommand::Recalculate => run_recalculate(storage),
        AdsCommand::Explain { id } => run_explain(storage, id),
        AdsCommand::Delete { id } => run_delete(storage, id),
        AdsCommand::Reference { id } => run_reference(storage, id),
    }
}
