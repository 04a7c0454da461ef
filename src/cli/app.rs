//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{block, nav, page, project_cmd, settings};
use crate::logging;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "wiki")]
#[command(author, version, about = "Edit and validate a block-based documentation wiki")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new wiki project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show backend, document and save status
    Status,

    /// Export the whole wiki as JSON
    Export {
        /// File or directory to write to (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the whole wiki with an exported JSON file
    Import {
        /// File to import
        file: PathBuf,
    },

    /// Check a JSON file against the document schema
    Validate {
        /// File to check
        file: PathBuf,
    },

    /// Manage pages
    #[command(subcommand)]
    Page(page::PageCommands),

    /// Manage the navigation tree
    #[command(subcommand)]
    Nav(nav::NavCommands),

    /// Manage content blocks of a page
    #[command(subcommand)]
    Block(block::BlockCommands),

    /// Show or change site settings
    #[command(subcommand)]
    Settings(settings::SettingsCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()
            .map(|global| global.default_format.into())
            .unwrap_or_default(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("wiki starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(execute(cli.command, &output))?;

    output.verbose("Command completed successfully");
    Ok(())
}

async fn execute(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
            let project = Project::init(&path)?;
            output.success(&format!("Initialized wiki project at {}", project.root().display()));
        }

        Commands::Status => project_cmd::status(output).await?,
        Commands::Export { output: path } => project_cmd::export(output, path.as_deref()).await?,
        Commands::Import { file } => project_cmd::import(output, &file).await?,
        Commands::Validate { file } => project_cmd::validate(output, &file)?,

        Commands::Page(cmd) => page::run(cmd, output).await?,
        Commands::Nav(cmd) => nav::run(cmd, output).await?,
        Commands::Block(cmd) => block::run(cmd, output).await?,
        Commands::Settings(cmd) => settings::run(cmd, output).await?,
    }

    Ok(())
}
