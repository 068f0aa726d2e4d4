//! Roller CLI
//!
//! Resolves and queries permissions stored in a JSON group store.

use clap::{Parser, Subcommand};
use roller::{
    JsonStore, Processor, Provider, Ranker,
    config::{AppConfig, LogFormat, load_config},
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Roller - weighted permission groups
#[derive(Parser, Debug)]
#[command(name = "roller")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ROLLER_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "ROLLER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to the JSON group store; overrides the config file
    #[arg(short, long)]
    store: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a subject's resolved permission list as JSON
    Resolve {
        subject: String,

        /// Flag to apply on every group that defines it (repeatable)
        #[arg(short, long = "flag")]
        flags: Vec<String>,

        /// Bypass the resolution cache
        #[arg(long)]
        direct: bool,
    },
    /// Check whether a subject holds a permission node
    Check {
        subject: String,
        node: String,

        /// Minimum level the subject must have
        #[arg(short, long)]
        level: Option<i64>,
    },
    /// Check whether one subject outranks another
    Compare { source: String, target: String },
    /// List stored groups in merge order
    Groups,
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(store) = &args.store {
        config.store.path = store.clone();
    }

    init_logging(&config, args.log_level.as_deref());
    info!(version = env!("CARGO_PKG_VERSION"), "Starting roller");

    let store = JsonStore::open(config.store.expanded_path(), config.store.options())
        .inspect_err(|e| error!(error = %e, "Failed to open group store"))?;

    match args.command {
        Command::Resolve {
            subject,
            flags,
            direct,
        } => {
            let list = if flags.is_empty() {
                let ranker = Ranker::from_config(&store, &config);
                if direct {
                    ranker.cache().direct_process(&subject)?
                } else {
                    ranker.permissible(&subject)?.into_list()
                }
            } else {
                let raw = store.raw_list(&subject)?;
                Processor::with_order(&store, config.resolver.weight_order)
                    .process_flags(&raw, flags.as_slice())?
            };
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Command::Check {
            subject,
            node,
            level,
        } => {
            let ranker = Ranker::from_config(&store, &config);
            let permissible = ranker.permissible(&subject)?;
            let allowed = match level {
                Some(level) => permissible.has_permission_with_level(&node, level),
                None => permissible.has_permission(&node),
            };

            if allowed {
                let granted = ranker
                    .matcher()
                    .find_match(permissible.list(), &node)
                    .unwrap_or(node.as_str());
                println!("allowed (granted by '{}')", granted);
            } else {
                println!("denied");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Compare { source, target } => {
            let ranker = Ranker::from_config(&store, &config);
            if ranker.is_higher_level(&source, &target)? {
                println!("{} outranks {}", source, target);
            } else {
                println!("{} does not outrank {}", source, target);
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Groups => {
            let mut groups = store.groups();
            config
                .resolver
                .weight_order
                .sort_by_weight(&mut groups, |g| g.weight);
            for group in groups {
                let flags: Vec<&str> = group.flags.keys().map(String::as_str).collect();
                println!(
                    "{:>6}  {:<20} {}{}",
                    group.weight,
                    group.id,
                    group.display_name(),
                    if flags.is_empty() {
                        String::new()
                    } else {
                        format!(" [flags: {}]", flags.join(", "))
                    }
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
