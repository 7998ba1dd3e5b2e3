//! Command line host for the content graph.
//!
//! Commands:
//! - `aliases` - list the content identifiers registered by module manifests
//! - `show <file> [--filter <text>]` - print the dependency tree of a file
//! - `clone <file> <new-name> [--old-name <name>] [--dry-run]` - clone a file and its
//!   specific dependencies under a new name
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;

use content_graph::{
  AliasIndex, ClonedPayload, DependencyGraph, GraphConfig, GraphWarning, dependency_tree,
};

#[derive(Parser)]
#[command(name = "content-graph")]
#[command(about = "Inspect and clone interlinked game content files")]
#[command(version)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Configuration file (defaults to content_graph.config.json in the working directory)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Root directory holding one folder per module
  #[arg(short, long, global = true)]
  mods_root: Option<PathBuf>,

  /// Verbose logging (-v, -vv for more)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
  /// List registered content identifiers
  Aliases,
  /// Print the dependency tree of a file
  Show {
    /// File to inspect
    file: PathBuf,
    /// Only show entries whose name contains this text
    #[arg(short, long)]
    filter: Option<String>,
  },
  /// Clone a file and the dependencies specific to it
  Clone {
    /// File to clone
    file: PathBuf,
    /// Name replacing the old name in paths and contents
    new_name: String,
    /// Name to replace (defaults to the file name without its type suffix)
    #[arg(long)]
    old_name: Option<String>,
    /// Report what would be written without touching disk
    #[arg(long)]
    dry_run: bool,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let mut config = match &cli.config {
    Some(path) => GraphConfig::from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display()))?,
    None => {
      let cwd = std::env::current_dir().context("failed to read working directory")?;
      GraphConfig::discover(&cwd)
    }
  };
  if let Some(mods_root) = cli.mods_root {
    config = config.with_mods_root(mods_root);
  }

  let mut graph = DependencyGraph::new(config, AliasIndex::default());
  let registered = graph.load_corpus();
  info!("loaded {registered} content units");

  let result = run(&mut graph, cli.command);
  let warnings = graph.take_warnings();
  if !warnings.is_empty() {
    eprint!("{}", warning_summary(&warnings));
  }
  result
}

fn run(graph: &mut DependencyGraph, command: Commands) -> Result<()> {
  match command {
    Commands::Aliases => {
      for (identifier, unit) in graph.aliases().iter() {
        println!("{identifier}\t{}", unit.root.display());
      }
    }
    Commands::Show { file, filter } => {
      let id = graph
        .open(&file)
        .with_context(|| format!("failed to open {}", file.display()))?;
      match dependency_tree(graph, id, filter.as_deref()) {
        Some(tree) => print!("{}", tree.render()),
        None => println!("nothing matches the filter"),
      }
    }
    Commands::Clone {
      file,
      new_name,
      old_name,
      dry_run,
    } => {
      let id = graph
        .open(&file)
        .with_context(|| format!("failed to open {}", file.display()))?;
      let old_name = old_name.unwrap_or_else(|| graph.name_for_cloning(id));
      if old_name == new_name {
        bail!("new name must differ from '{old_name}'");
      }

      let report = graph
        .clone_node(id, &old_name, &new_name, !dry_run)
        .with_context(|| format!("failed to clone {}", file.display()))?;

      let verb = if dry_run { "would write" } else { "wrote" };
      for cloned in &report.files {
        let how = match cloned.payload {
          ClonedPayload::Text(_) => "rewritten",
          ClonedPayload::Copy => "copied",
        };
        println!("{verb} {} ({how} from {})", cloned.destination.display(), cloned.source.display());
      }
      let verb = if dry_run { "would patch" } else { "patched" };
      for patched in &report.patched {
        println!("{verb} {}", patched.path.display());
      }
    }
  }
  Ok(())
}

fn init_logging(verbosity: u8) {
  let level = match verbosity {
    0 => log::LevelFilter::Info,
    1 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };
  env_logger::Builder::new()
    .filter_level(level)
    .format_timestamp(None)
    .init();
}

/// One line per warning, headed by the count.
fn warning_summary(warnings: &[GraphWarning]) -> String {
  let mut out = format!("{} warning(s):\n", warnings.len());
  for warning in warnings {
    out.push_str(&format!("  {warning}\n"));
  }
  out
}
