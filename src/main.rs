//! Binary entrypoint for the CupboardInfo harness CLI.
//!
//! Commands:
//! - `init [--force]` - write default settings to `<config-dir>/CupboardInfo.json`
//! - `check` - run the plugin-load config sequence and report what happened
//! - `replay <scenario.toml>` - drive the plugin with a scenario and print chat output
//!
//! See the library crate docs for module‑level details: `cupboardinfo::`.
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use cupboardinfo::config::{ConfigManager, ConfigStore, ConfigTarget, FileConfigStore, LoadOutcome};
use cupboardinfo::plugin::PLUGIN_NAME;
use cupboardinfo::replay::{replay, Scenario};

#[derive(Parser)]
#[command(name = "cupboardinfo")]
#[command(about = "Cupboard authorization notices: settings tools and scenario replay")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Host config directory holding the plugin settings file
    #[arg(short, long, default_value = "config", global = true)]
    config_dir: PathBuf,

    /// Also append log records to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default settings
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },
    /// Load, validate and re-save the settings file
    Check,
    /// Replay a scenario file against an in-memory host
    Replay {
        /// Scenario file (TOML)
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref(), cli.verbose);

    let store = FileConfigStore::new(&cli.config_dir, PLUGIN_NAME);

    match cli.command {
        Commands::Init { force } => {
            let path = store.path_for(ConfigTarget::Primary);
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            let manager = ConfigManager::new(store);
            manager
                .persist(&ConfigManager::<FileConfigStore>::default_settings())
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Default settings written to {}", path.display());
            println!("Created {}", path.display());
        }
        Commands::Check => {
            let manager = ConfigManager::new(store);
            let outcome = manager.load_and_persist();
            print_outcome(&outcome);
        }
        Commands::Replay { scenario } => {
            let parsed = Scenario::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let report = replay(&parsed, store)?;
            print_outcome(&report.config);
            for delivery in &report.deliveries {
                println!("[{}] {}", delivery.name, delivery.text);
            }
            info!(
                "Replayed {} event(s), {} chat line(s)",
                parsed.events.len(),
                report.deliveries.len()
            );
        }
    }

    Ok(())
}

fn print_outcome(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded(s) => println!(
            "Settings loaded (version {})",
            s.schema_version.as_deref().unwrap_or("?")
        ),
        LoadOutcome::Created(_) => println!("No settings file found; defaults written"),
        LoadOutcome::Recovered { backup, cause, .. } => {
            println!("Settings invalid ({}); defaults written", cause);
            if let Some(path) = backup {
                println!("Original saved to {}", path.display());
            }
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = log_file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    if let Some(f) = file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
