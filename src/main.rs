//! gearmatrix CLI: run, save and reload gear train calculations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as Json;
use tracing_subscriber::EnvFilter;

use gearmatrix::{ConfigStore, EngineConfig, StoreConfig, Workbench};

#[derive(Parser)]
#[command(name = "gearmatrix", version, about = "Gear train speed and torque propagation")]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory of saved configs
    #[arg(long, global = true, default_value = "saved_configs")]
    store: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        StoreConfig::Directory { path: self.store.clone() }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a calculation request and print the report
    Calculate {
        /// Request file (JSON)
        file: PathBuf,
        /// Print CSV instead of JSON
        #[arg(long)]
        csv: bool,
    },
    /// Save a request payload to the store
    Save {
        /// Request file (JSON)
        file: PathBuf,
        /// Name to save under (generated when omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// List saved configs
    List,
    /// Print a saved config
    Load {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("reading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let bench = Workbench::open(config, &cli.store_config()).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &bench, &mut out).await?;
    out.flush()?;
    Ok(())
}

async fn run<S: ConfigStore>(command: Commands, bench: &Workbench<S>, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Calculate { file, csv } => {
            let payload = read_payload(&file)?;
            let report = bench.calculate_json(&payload)?;
            if csv {
                bench.export_csv(&report, out)?;
            } else {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            }
        }
        Commands::Save { file, name } => {
            let payload = read_payload(&file)?;
            let saved = bench.save(name.as_deref(), &payload).await?;
            writeln!(out, "{}", saved.filename)?;
        }
        Commands::List => {
            for name in bench.list().await? {
                writeln!(out, "{name}")?;
            }
        }
        Commands::Load { name } => {
            let payload = bench.load(&name).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
        }
    }
    Ok(())
}

fn read_payload(path: &Path) -> Result<Json> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
