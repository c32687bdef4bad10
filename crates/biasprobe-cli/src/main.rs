//! biasprobe - randomized cognitive-bias probe batteries for language models
//!
//! ## Commands
//!
//! - `run`: build a randomized battery from a catalog, execute it, export results
//! - `order`: show the probe order the configured strategy produces
//! - `latin-square`: print a Latin square

mod echo;
mod ollama;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, Level};

use biasprobe_core::metrics::METRICS;
use biasprobe_core::{
    generate_latin_square, load_catalog, HarnessConfig, Metadata, ProbeRandomizer, ProbeType,
    Responder,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::echo::EchoResponder;
use crate::ollama::{OllamaResponder, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(name = "biasprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Randomized cognitive-bias probe batteries for language models", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Harness configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and execute a randomized battery, then export the results
    Run {
        /// Probe catalog (JSON)
        #[arg(long)]
        catalog: PathBuf,

        /// Model to probe
        #[arg(short, long, default_value = "llama3")]
        model: String,

        /// Ollama server URL
        #[arg(long, env = "OLLAMA_BASE_URL", default_value = DEFAULT_BASE_URL)]
        ollama_url: String,

        /// Per-request HTTP timeout in seconds
        #[arg(long, default_value = "120")]
        timeout_secs: u64,

        /// Answer every prompt with the prompt itself instead of calling a model
        #[arg(long)]
        dry_run: bool,

        /// Probe types to include (default: every type in the catalog)
        #[arg(short, long, value_delimiter = ',')]
        probe_types: Vec<String>,

        /// Variants per probe type
        #[arg(long, default_value = "1")]
        max_variants: usize,

        /// Restrict variants to one domain
        #[arg(short, long)]
        domain: Option<String>,

        /// Export format: json or csv
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Write the export here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the probe order the configured order-effect prevention produces
    Order {
        /// Probe types to order
        #[arg(value_delimiter = ',', required = true)]
        probe_types: Vec<String>,

        /// Number of sessions to plan
        #[arg(short, long, default_value = "1")]
        sessions: usize,
    },

    /// Print an n x n Latin square
    LatinSquare {
        /// Square size
        n: usize,

        /// Seed for the row shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    biasprobe_core::telemetry::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    let outcome = match cli.command {
        Commands::Run {
            catalog,
            model,
            ollama_url,
            timeout_secs,
            dry_run,
            probe_types,
            max_variants,
            domain,
            format,
            output,
        } => {
            let responder: Arc<dyn Responder> = if dry_run {
                Arc::new(EchoResponder::new(model))
            } else {
                Arc::new(
                    OllamaResponder::new(ollama_url, model, Duration::from_secs(timeout_secs))
                        .context("Failed to create Ollama client")?,
                )
            };
            let request = RunRequest {
                catalog,
                probe_types: parse_probe_types(&probe_types)?,
                max_variants,
                domain,
                format,
                output,
            };
            cmd_run(&config, responder, request).await
        }
        Commands::Order {
            probe_types,
            sessions,
        } => cmd_order(&config, &parse_probe_types(&probe_types)?, sessions),
        Commands::LatinSquare { n, seed } => cmd_latin_square(n, seed.or(config.randomization.seed)),
    };

    METRICS.flush();
    outcome
}

fn load_config(path: Option<&Path>) -> Result<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => HarnessConfig::from_env().context("Invalid configuration in environment"),
    }
}

fn parse_probe_types(names: &[String]) -> Result<Vec<ProbeType>> {
    names
        .iter()
        .map(|name| {
            name.trim()
                .parse::<ProbeType>()
                .with_context(|| format!("Unknown probe type: {name}"))
        })
        .collect()
}

struct RunRequest {
    catalog: PathBuf,
    probe_types: Vec<ProbeType>,
    max_variants: usize,
    domain: Option<String>,
    format: String,
    output: Option<PathBuf>,
}

async fn cmd_run(
    config: &HarnessConfig,
    responder: Arc<dyn Responder>,
    request: RunRequest,
) -> Result<()> {
    let registry = load_catalog(&request.catalog)
        .with_context(|| format!("Failed to load catalog {}", request.catalog.display()))?;

    let mut battery = config.build_battery(registry);
    let mut metadata = Metadata::new();
    metadata.insert("model_provider".to_string(), json!(responder.provider_name()));
    metadata.insert("model_name".to_string(), json!(responder.model_name()));
    let session = battery.create_session(metadata);

    let probe_types = (!request.probe_types.is_empty()).then_some(request.probe_types.as_slice());
    let items = battery
        .create_randomized_battery(probe_types, request.max_variants, request.domain.as_deref())
        .context("Failed to build battery")?;
    info!(session_id = %session, items = items.len(), "battery ready");

    battery
        .execute_battery(&items, responder, &config.execution.to_options())
        .await
        .context("Failed to execute battery")?;

    let export = battery
        .export_results(&request.format)
        .context("Failed to export results")?
        .render()?;

    match request.output {
        Some(path) => {
            std::fs::write(&path, export)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Results written to {}", path.display());
        }
        None => println!("{export}"),
    }
    Ok(())
}

fn cmd_order(config: &HarnessConfig, probe_types: &[ProbeType], sessions: usize) -> Result<()> {
    let randomizer = ProbeRandomizer::new(config.randomization.clone());
    println!("order prevention: {}", config.randomization.order_prevention);
    for _ in 0..sessions {
        let session = randomizer.create_session(Metadata::new());
        let order = randomizer.select_probe_order(probe_types, Some(&session));
        let names: Vec<&str> = order.iter().map(|pt| pt.as_str()).collect();
        println!("{session}  {}", names.join(" -> "));
    }
    Ok(())
}

fn cmd_latin_square(n: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let square = generate_latin_square(n, &mut rng);
    for row in square.rows() {
        let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        println!("{}", cells.join(" "));
    }
    Ok(())
}
