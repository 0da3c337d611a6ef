//! onelink CLI
//!
//! Command-line interface for onelink - link collections with previews.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onelink_core::{Config, StorageError, Store, StoreError};

mod commands;
mod output;
mod prompt;
mod tui;

use output::{Output, OutputFormat};

/// Environment variable that enables logging (value is the level)
pub const LOG_ENV: &str = "ONELINK_LOG";

#[derive(Parser)]
#[command(name = "onelink")]
#[command(about = "onelink - Collect links into named collections with rich previews")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Manage collections
    Collection {
        #[command(subcommand)]
        command: CollectionCommands,
    },
    /// Manage links
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Export the active collection as an HTML page
    Export {
        /// Directory to write the page to
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (storage location, counts, active collection)
    Status,
}

#[derive(Subcommand)]
enum CollectionCommands {
    /// Create a collection and make it active
    #[command(alias = "create")]
    New {
        /// Collection name
        name: String,
    },
    /// List all collections
    #[command(alias = "ls")]
    List,
    /// Switch the active collection
    Use {
        /// Collection ID (full UUID or prefix) or exact name
        collection: String,
    },
    /// Rename the active collection
    Rename {
        /// New name
        name: String,
    },
    /// Delete the active collection
    #[command(alias = "rm")]
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LinkCommands {
    /// Add a link to a collection and fetch its preview
    Add {
        /// URL to save
        url: String,
        /// Custom title (defaults to the hostname)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Target collection (defaults to the active one)
        #[arg(short, long)]
        collection: Option<String>,
    },
    /// List links in a collection
    #[command(alias = "ls")]
    List {
        /// Collection to list (defaults to the active one)
        #[arg(short, long)]
        collection: Option<String>,
    },
    /// Show link details
    Show {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Open a link in the default browser
    Open {
        /// Link ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, preview_endpoint, favicon_endpoint, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = recovery_hint(&e) {
            eprintln!("⚠ {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without opening the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    // TUI is the default when no command is given
    let Some(command) = cli.command else {
        return tui::run(config).await;
    };
    if matches!(command, Commands::Tui) {
        return tui::run(config).await;
    }

    init_cli_logging();

    let mut store = Store::open_with_config(config).context("Failed to open store")?;

    match command {
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Collection { command } => {
            handle_collection_command(command, &mut store, &output)
        }
        Commands::Link { command } => handle_link_command(command, &mut store, &output).await,
        Commands::Export { output: dir } => commands::export::run(&store, dir, &output),
        Commands::Status => commands::status::show(&store, &output),
    }
}

fn handle_collection_command(
    command: CollectionCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        CollectionCommands::New { name } => commands::collection::create(store, name, output),
        CollectionCommands::List => commands::collection::list(store, output),
        CollectionCommands::Use { collection } => {
            commands::collection::select(store, collection, output)
        }
        CollectionCommands::Rename { name } => commands::collection::rename(store, name, output),
        CollectionCommands::Delete { yes } => commands::collection::delete(store, yes, output),
    }
}

async fn handle_link_command(
    command: LinkCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        LinkCommands::Add {
            url,
            title,
            collection,
        } => commands::link::add(store, url, title, collection, output).await,
        LinkCommands::List { collection } => commands::link::list(store, collection, output),
        LinkCommands::Show { id } => commands::link::show(store, id, output),
        LinkCommands::Open { id } => commands::link::open(store, id, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Suggestion for a storage failure anywhere in the error chain
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            e.recovery_suggestion()
        } else {
            cause
                .downcast_ref::<StorageError>()
                .and_then(StorageError::recovery_suggestion)
        }
    })
}

/// Log filter for the given level, scoped to this workspace's crates
pub fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("onelink_core={},onelink={}", level, level))
}

/// Initialize logging for one-shot commands
///
/// Only initializes if ONELINK_LOG is set. Logs go to stderr so JSON and
/// quiet output on stdout stay clean.
fn init_cli_logging() {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(&log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
