//! hctree workload driver
//!
//! Builds a tiered index, loads it with keys, replays a skewed lookup
//! workload and reports what the tiering layer did.
//!
//! Run with: cargo run --release -- run --queries 2000000
//!
//! Environment variables override the config file (see `hctree config`),
//! and `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hctree::{Config, Key, LoggingConfig, TieredIndex, WorkloadConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hctree")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hot/cold tiered B-tree index workload driver")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a synthetic skewed workload
    Run {
        /// Keys to insert
        #[arg(long)]
        keys: Option<u64>,
        /// Lookups to issue
        #[arg(long)]
        queries: Option<u64>,
        /// Initial sampling rate D
        #[arg(long)]
        sampling_rate: Option<f64>,
        /// Disable sampling-rate adaptation
        #[arg(long)]
        no_adapt: bool,
        /// Range scan every N lookups
        #[arg(long)]
        range_every: Option<u64>,
    },

    /// Print a default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { output } => {
            let content = hctree::config::generate_default_config();
            match output {
                Some(path) => std::fs::write(&path, content)
                    .with_context(|| format!("writing config to {:?}", path))?,
                None => print!("{}", content),
            }
            Ok(())
        }
        Commands::Run {
            keys,
            queries,
            sampling_rate,
            no_adapt,
            range_every,
        } => {
            let mut config = match &cli.config {
                Some(path) => Config::load_with_env(path)?,
                None => Config::load_default(),
            };

            if let Some(keys) = keys {
                config.workload.keys = keys;
            }
            if let Some(queries) = queries {
                config.workload.queries = queries;
            }
            if let Some(rate) = sampling_rate {
                config.tiering.sampling_rate = rate;
            }
            if no_adapt {
                config.tiering.adapt_sampling = false;
            }
            if let Some(every) = range_every {
                config.workload.range_every = every;
            }

            init_logging(&config.logging);
            tracing::info!("hctree workload driver v{}", env!("CARGO_PKG_VERSION"));

            run_workload(&config, &cli.format)
        }
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hctree={}", config.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn run_workload(config: &Config, format: &str) -> anyhow::Result<()> {
    let workload = &config.workload;
    let mut index: TieredIndex<Key> = TieredIndex::new(
        config.index.max_key,
        config.index.branching_factor,
        config.tiering.clone(),
    )
    .context("building tiered index")?;

    let mut rng = StdRng::seed_from_u64(workload.seed);
    let keys = spread_keys(config.index.max_key, workload.keys);
    anyhow::ensure!(!keys.is_empty(), "workload inserts no keys");

    let load_start = Instant::now();
    for &key in &keys {
        index.insert(key, key)?;
    }
    tracing::info!(keys = keys.len(), elapsed = ?load_start.elapsed(), "Loaded cold tier");

    let hotspot = pick_hotspot(&keys, workload, &mut rng);
    tracing::info!(hotspot = hotspot.len(), "Running {} lookups", workload.queries);

    let run_start = Instant::now();
    let mut emitted = 0usize;
    for q in 1..=workload.queries {
        let key = if rng.gen::<f64>() < workload.hot_access_ratio {
            hotspot[rng.gen_range(0..hotspot.len())]
        } else {
            keys[rng.gen_range(0..keys.len())]
        };
        index.search(key)?;

        if workload.range_every > 0 && q % workload.range_every == 0 {
            let lo = keys[rng.gen_range(0..keys.len())];
            let hi = lo.saturating_add(workload.range_width.saturating_sub(1) as Key);
            emitted += index.range_search(lo, hi, |_, _| {});
        }
    }
    let elapsed = run_start.elapsed();

    let stats = index.stats();
    tracing::info!(elapsed = ?elapsed, range_keys = emitted, "Workload complete");

    if format == "json" {
        let report = serde_json::json!({
            "stats": stats,
            "avg_node_visits": stats.avg_node_visits(),
            "hot_hit_ratio": stats.hot_hit_ratio(),
            "adapt_state": index.adapt_state(),
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", stats);
        println!(
            "Hot hit ratio: {:.1}%, adaptations: {}, capacity refusals: {}, elapsed: {:?}",
            stats.hot_hit_ratio() * 100.0,
            stats.adaptations,
            stats.capacity_refusals,
            elapsed
        );
    }

    Ok(())
}

/// Spread `count` keys evenly over `[0, max_key]`
fn spread_keys(max_key: Key, count: u64) -> Vec<Key> {
    let domain = max_key as u64 + 1;
    let count = count.min(domain);
    (0..count).map(|i| (i * domain / count.max(1)) as Key).collect()
}

/// Random subset of the keys that receives most of the traffic
fn pick_hotspot(keys: &[Key], workload: &WorkloadConfig, rng: &mut StdRng) -> Vec<Key> {
    let size = ((keys.len() as f64 * workload.hot_key_fraction).ceil() as usize).clamp(1, keys.len());
    let mut hotspot = keys.to_vec();
    hotspot.shuffle(rng);
    hotspot.truncate(size);
    hotspot
}
