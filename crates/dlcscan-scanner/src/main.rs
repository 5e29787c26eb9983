use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dlcscan_scanner::selection::{LauncherCheck, SelectionEntry, SelectionRegistry};
use dlcscan_scanner::steam::AppInfoCache;
use dlcscan_scanner::{
    CancelToken, Discovery, DiscoveryEvent, DiscoveryOptions, Outcome, ProgressTracker,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dlcscan", about = "List installed Steam games and the DLC they can unlock")]
struct Args {
    /// Steam installation directory
    #[arg(long, value_name = "PATH")]
    steam_path: Option<PathBuf>,

    /// Directory the Paradox launcher is installed in
    #[arg(long, value_name = "PATH")]
    launcher_path: Option<PathBuf>,

    /// Directory holding cached app-info dumps
    #[arg(long, value_name = "PATH")]
    cache_dir: Option<PathBuf>,

    /// JSON file with discovery options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Check every discovered game and DLC
    #[arg(long)]
    select_all: bool,

    /// Also list games protected by anti-cheat or DLL checks
    #[arg(long)]
    no_block_protected: bool,

    /// Print the selection as JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Number of discovery passes over the same selection
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    passes: u32,
}

impl Args {
    fn options(&self) -> Result<DiscoveryOptions> {
        let mut options = match &self.config {
            Some(path) => DiscoveryOptions::load(path)
                .with_context(|| format!("unable to load options from {}", path.display()))?,
            None => DiscoveryOptions::default(),
        };
        if let Some(path) = &self.steam_path {
            options.steam.primary_install = Some(path.clone());
        }
        if let Some(path) = &self.launcher_path {
            options.steam.launcher_root = Some(path.clone());
        }
        if let Some(path) = &self.cache_dir {
            options.cache_dir = Some(path.clone());
        }
        if self.select_all {
            options.select_all_new = true;
        }
        if self.no_block_protected {
            options.block_protected = false;
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let args = Args::parse();
    let options = args.options()?;
    let cache_dir = options
        .cache_dir
        .clone()
        .or_else(AppInfoCache::default_dir)
        .context("no cache directory available, pass --cache-dir")?;
    let discovery = Discovery::new(options, Arc::new(AppInfoCache::new(cache_dir)));

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("failed to install Ctrl-C handler")?;

    let registry = SelectionRegistry::new();
    for pass in 1..=args.passes {
        let mut tracker = ProgressTracker::default();
        let mut shown = None;
        let report = discovery
            .run_with(&registry, &cancel, |event| {
                if let DiscoveryEvent::Progress(progress) = event {
                    let percent = tracker.apply(*progress);
                    if shown != Some(percent) {
                        shown = Some(percent);
                        eprintln!("pass {pass}: {percent}%");
                    }
                }
            })
            .with_context(|| format!("discovery pass {pass} failed"))?;
        tracing::info!(pass, applied = report.applied, "pass finished");
        if report.outcome == Outcome::Cancelled {
            eprintln!("Discovery cancelled.");
            break;
        }
    }

    if args.json {
        let snapshot = registry.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("unable to serialize selection")?
        );
    } else if registry.is_empty() {
        println!("No applicable programs were found on your computer!");
    } else {
        print_tree(&registry.usable());
    }

    if registry.launcher_check() == LauncherCheck::NothingToAdd {
        eprintln!(
            "warning: the Paradox Launcher is selected but no installed Paradox game has DLC to add"
        );
    }
    Ok(())
}

fn check(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn print_tree(entries: &[SelectionEntry]) {
    for entry in entries {
        println!("{} {} ({})", check(entry.enabled), entry.name, entry.id);
        for (id, name) in entry.all_addable() {
            println!("    {} {} ({})", check(entry.is_addable_selected(*id)), name, id);
        }
    }
}
