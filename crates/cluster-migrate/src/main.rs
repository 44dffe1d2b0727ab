//! cluster-migrate CLI
//!
//! Copies APIs, consumers, credentials, plugins and tokens from one cluster's
//! admin API to another's.

// CLI tool - relax pedantic lints for ergonomics
#![allow(clippy::pedantic)]

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cluster_migrate::{Endpoint, MigrationConfig, Pipeline};

#[derive(Parser)]
#[command(name = "cluster-migrate")]
#[command(version)]
#[command(about = "Migrate resources between two clusters through their admin APIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Source admin API (host:admin_port)
    #[arg(long, value_name = "HOST:PORT", env = "CLUSTER_MIGRATE_FROM")]
    from: Option<Endpoint>,

    /// Destination admin API (host:admin_port)
    #[arg(long, value_name = "HOST:PORT", env = "CLUSTER_MIGRATE_TO")]
    to: Option<Endpoint>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Dry run mode (read the source, don't write to destination)
    #[arg(long)]
    dry_run: bool,

    /// Request timeout override, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Allow clusters running different versions
    #[arg(long)]
    skip_version_check: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the migration
    Run(RunArgs),

    /// Only check that both clusters are compatible
    Check(RunArgs),

    /// Show the migration plan without contacting any cluster
    Plan {
        /// Configuration file path
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Run(args)) => {
            run_migration(&args).await?;
        }
        Some(Commands::Check(args)) => {
            check_clusters(&args).await?;
        }
        Some(Commands::Plan { config }) => {
            show_plan(config.as_deref())?;
        }
        None => {
            let args = cli.run;
            if args.from.is_some() || args.to.is_some() || args.config.is_some() {
                run_migration(&args).await?;
            } else {
                eprintln!("Usage: cluster-migrate --from <HOST:PORT> --to <HOST:PORT>");
                eprintln!("Try 'cluster-migrate --help' for more information.");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Merges the optional config file with CLI flags; flags win.
fn load_config(args: &RunArgs) -> anyhow::Result<MigrationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            MigrationConfig::from_file(path)?
        }
        None => MigrationConfig::default(),
    };

    if let Some(from) = &args.from {
        config.source = Some(from.clone());
    }
    if let Some(to) = &args.to {
        config.destination = Some(to.clone());
    }
    if args.dry_run {
        config.options.dry_run = true;
    }
    if let Some(ms) = args.timeout_ms {
        config.options.timeout_ms = ms;
    }
    if args.skip_version_check {
        config.options.check_version = false;
    }

    config.validate()?;
    Ok(config)
}

async fn run_migration(args: &RunArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let pipeline = Pipeline::new(config)?;
    let stats = pipeline.run().await?;

    println!("\n✅ Migration Complete!");
    println!("   Read:       {}", stats.read);
    println!("   Created:    {}", stats.created);
    println!("   Skipped:    {}", stats.skipped);
    if stats.planned > 0 {
        println!("   Planned:    {} (dry run)", stats.planned);
    }
    println!("   Pages:      {}", stats.pages);
    println!("   Duration:   {:.2}s", stats.duration_secs);
    println!("   Throughput: {:.0} records/sec", stats.throughput());

    Ok(())
}

async fn check_clusters(args: &RunArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let pipeline = Pipeline::new(config)?;
    let node = pipeline.check().await?;

    println!("✅ Clusters are compatible!");
    println!("   Version: {}", node.version);
    println!("   Plugins: {}", node.plugins.len());

    Ok(())
}

fn show_plan(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => MigrationConfig::from_file(path)?,
        None => MigrationConfig::default(),
    };
    let plan = config.plan()?;

    println!("Migration plan ({} steps):", plan.len());
    for (i, step) in plan.steps().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, step);
    }

    Ok(())
}
