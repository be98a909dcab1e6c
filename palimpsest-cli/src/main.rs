/*!
Palimpsest CLI - command-line interface for the snapshot retention engine.

This CLI provides utilities for inspecting and managing per-document snapshot
histories stored in a vault directory: capture, listing, pinning, restore,
retention pruning, and relocation after a source rename.
*/

use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use palimpsest_core::{
    LocalVault, MetadataUpdate, RestoreCoordinator, RetentionRules, Snapshot, SnapshotStore,
    StoreConfig,
};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "palimpsest")]
#[command(about = "CLI for the Palimpsest document snapshot engine")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Vault directory holding the documents and the snapshot root
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Snapshot root directory inside the vault
    #[arg(long, global = true, default_value = ".snapshots")]
    root: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a snapshot of a document's current state
    Take {
        /// Vault-relative document path
        document: String,
        /// Free-text annotation for the snapshot
        #[arg(short, long)]
        note: Option<String>,
        /// Skip the automatic retention pass after capture
        #[arg(long)]
        no_prune: bool,
    },
    /// List a document's snapshots, newest first
    List {
        /// Vault-relative document path
        document: String,
        /// Emit machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one snapshot's metadata (and optionally its body)
    Show {
        /// Vault-relative document path
        document: String,
        /// 1-based index into the newest-first listing
        index: usize,
        /// Also print the snapshot body
        #[arg(long)]
        body: bool,
    },
    /// Pin a snapshot, excluding it from retention deletion
    Pin {
        document: String,
        /// 1-based index into the newest-first listing
        index: usize,
    },
    /// Unpin a snapshot
    Unpin {
        document: String,
        /// 1-based index into the newest-first listing
        index: usize,
    },
    /// Restore a document to a prior snapshot's body
    Restore {
        document: String,
        /// 1-based index into the newest-first listing
        index: usize,
    },
    /// Apply the retention policy to a document's history
    Prune {
        document: String,
        /// Full-fidelity window in days
        #[arg(long)]
        keep_daily: Option<u32>,
        /// One-per-day window in weeks
        #[arg(long)]
        keep_weekly: Option<u32>,
        /// One-per-week window in months
        #[arg(long)]
        keep_monthly: Option<u32>,
    },
    /// Delete a single snapshot
    Delete {
        document: String,
        /// 1-based index into the newest-first listing
        index: usize,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Relocate a document's history after the source was renamed
    Rename {
        /// Old vault-relative document path
        old: String,
        /// New vault-relative document path
        new: String,
    },
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Captured")]
    captured: String,
    #[tabled(rename = "Words")]
    words: usize,
    #[tabled(rename = "Pinned")]
    pinned: &'static str,
    #[tabled(rename = "Note")]
    note: String,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn pick(snapshots: &[Snapshot], index: usize) -> Result<&Snapshot> {
    if index == 0 || index > snapshots.len() {
        bail!("no snapshot #{index} (history has {})", snapshots.len());
    }
    Ok(&snapshots[index - 1])
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn print_listing(snapshots: &[Snapshot]) {
    let rows: Vec<SnapshotRow> = snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| SnapshotRow {
            index: i + 1,
            captured: s.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            words: s.word_count,
            pinned: if s.is_pinned { "yes" } else { "" },
            note: s.note.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");

    let pinned = snapshots.iter().filter(|s| s.is_pinned).count();
    println!("{} snapshots ({pinned} pinned)", snapshots.len());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let auto_prune = !matches!(&cli.command, Commands::Take { no_prune: true, .. });
    tracing::debug!("vault = {}, snapshot root = {}", cli.vault.display(), cli.root);
    let config = StoreConfig {
        root_dir: cli.root.clone(),
        auto_prune,
        ..StoreConfig::default()
    };
    let store = SnapshotStore::new(LocalVault::new(&cli.vault), config);

    match cli.command {
        Commands::Take { document, note, .. } => {
            let snapshot = store.create_snapshot(&document, note.as_deref()).await?;
            println!(
                "Captured {} ({} words)",
                snapshot.path, snapshot.word_count
            );
        }
        Commands::List { document, json } => {
            let snapshots = store.get_snapshots(&document).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
            } else if snapshots.is_empty() {
                println!("No snapshots for {document}");
            } else {
                print_listing(&snapshots);
            }
        }
        Commands::Show { document, index, body } => {
            let snapshots = store.get_snapshots(&document).await?;
            let snapshot = pick(&snapshots, index)?;
            println!("Path:          {}", snapshot.path);
            println!("Original path: {}", snapshot.original_path);
            println!(
                "Captured:      {}",
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Words:         {}", snapshot.word_count);
            println!("Pinned:        {}", snapshot.is_pinned);
            println!("Note:          {}", snapshot.note);
            if body {
                println!("---");
                print!("{}", store.read_body(snapshot).await?);
            }
        }
        Commands::Pin { document, index } => {
            let snapshots = store.get_snapshots(&document).await?;
            let snapshot = pick(&snapshots, index)?;
            store
                .update_metadata(snapshot, MetadataUpdate { is_pinned: Some(true) })
                .await?;
            println!("Pinned {}", snapshot.path);
        }
        Commands::Unpin { document, index } => {
            let snapshots = store.get_snapshots(&document).await?;
            let snapshot = pick(&snapshots, index)?;
            store
                .update_metadata(snapshot, MetadataUpdate { is_pinned: Some(false) })
                .await?;
            println!("Unpinned {}", snapshot.path);
        }
        Commands::Restore { document, index } => {
            let snapshots = store.get_snapshots(&document).await?;
            let snapshot = pick(&snapshots, index)?;
            let coordinator = RestoreCoordinator::new(&store);
            if let Err(e) = coordinator.restore(&document, snapshot).await {
                eprintln!("Restore failed: {e}");
                std::process::exit(1);
            }
            println!(
                "Restored {document} to its {} state",
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
        }
        Commands::Prune {
            document,
            keep_daily,
            keep_weekly,
            keep_monthly,
        } => {
            let defaults = RetentionRules::default();
            let rules = RetentionRules {
                keep_daily: keep_daily.unwrap_or(defaults.keep_daily),
                keep_weekly: keep_weekly.unwrap_or(defaults.keep_weekly),
                keep_monthly: keep_monthly.unwrap_or(defaults.keep_monthly),
            };
            let removed = store.prune_with(&document, &rules).await?;
            println!("Pruned {removed} snapshots from {document}");
        }
        Commands::Delete { document, index, force } => {
            let snapshots = store.get_snapshots(&document).await?;
            let snapshot = pick(&snapshots, index)?;
            if !force && !confirm(&format!("Delete {}?", snapshot.path))? {
                println!("Aborted");
                return Ok(());
            }
            store.delete_snapshot(snapshot).await?;
            println!("Deleted {}", snapshot.path);
        }
        Commands::Rename { old, new } => {
            store.handle_source_rename(&old, &new).await?;
            println!("Relocated snapshot history of {old} to {new}");
        }
    }

    Ok(())
}
