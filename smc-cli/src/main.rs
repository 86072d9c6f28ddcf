//! SMC CLI: scan, backtest and config commands.
//!
//! Commands:
//! - `scan`: evaluate the latest window of a CSV candle file
//! - `backtest`: walk-forward replay over a whole CSV candle file
//! - `config show`: print the effective configuration and its hash
//! - `config validate`: check a TOML config file
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `info` level);
//! results go to stdout.

mod loader;
mod report;
mod store;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use smc_core::backtest::{aligned_reference, walk_forward, WalkForwardParams};
use smc_core::confirmation::{AlwaysConfirm, AlwaysReject, SmcConfirmation};
use smc_core::dedup::InMemorySignalStore;
use smc_core::domain::Timeframe;
use smc_core::{EvaluationInput, SignalPipeline, SmcConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use loader::load_candles;
use store::JsonlSignalStore;

#[derive(Parser)]
#[command(name = "smc", about = "SMC CLI: smart money concept signal engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the most recent window of a candle file.
    Scan {
        #[command(flatten)]
        source: Source,

        /// Candles in the evaluated window (the file tail).
        #[arg(long, default_value_t = 200)]
        window: usize,

        /// JSONL signal store; enables the duplicate filter.
        #[arg(long)]
        store: Option<PathBuf>,

        /// Confirmation policy used when the config requires confirmation.
        #[arg(long, value_enum, default_value_t = Confirmation::Reject)]
        confirmation: Confirmation,
    },
    /// Walk-forward replay over the whole candle file.
    Backtest {
        #[command(flatten)]
        source: Source,

        /// Candles per evaluation window.
        #[arg(long, default_value_t = 200)]
        window: usize,

        /// Candles between consecutive windows.
        #[arg(long, default_value_t = 1)]
        step: usize,

        /// Candles after each window used to label outcomes.
        #[arg(long, default_value_t = 12)]
        forward_bars: usize,

        /// Evaluate windows on a single thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Confirmation policy used when the config requires confirmation.
        #[arg(long, value_enum, default_value_t = Confirmation::Reject)]
        confirmation: Confirmation,

        /// Output directory for report.json and signals.csv.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Configuration commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct Source {
    /// CSV file: timestamp,open,high,low,close,volume.
    #[arg(long)]
    candles: PathBuf,

    /// Correlated instrument CSV for SMT divergence.
    #[arg(long)]
    reference: Option<PathBuf>,

    #[arg(long, default_value = "BTC/USDT")]
    symbol: String,

    /// Candle timeframe (1m, 5m, 15m, 1h, ...).
    #[arg(long, default_value = "5m")]
    timeframe: String,

    /// TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML with its hash.
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse and validate a TOML config file.
    Validate { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Confirmation {
    Reject,
    Always,
    Smc,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            source,
            window,
            store,
            confirmation,
        } => run_scan(&source, window, store.as_deref(), confirmation),
        Commands::Backtest {
            source,
            window,
            step,
            forward_bars,
            sequential,
            confirmation,
            output_dir,
        } => {
            let timeframe = parse_timeframe(&source.timeframe)?;
            let params = WalkForwardParams {
                window,
                step,
                forward_bars,
                parallel: !sequential,
                ..WalkForwardParams::new(&source.symbol, timeframe)
            };
            run_backtest(&source, &params, confirmation, output_dir.as_deref())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
            ConfigAction::Validate { path } => run_config_validate(&path),
        },
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SmcConfig> {
    match path {
        Some(p) => SmcConfig::from_file(p)
            .with_context(|| format!("failed to load config from {}", p.display())),
        None => Ok(SmcConfig::default()),
    }
}

fn parse_timeframe(raw: &str) -> Result<Timeframe> {
    raw.parse::<Timeframe>()
        .with_context(|| format!("invalid --timeframe '{raw}'"))
}

fn build_pipeline(config: SmcConfig, confirmation: Confirmation) -> Result<SignalPipeline> {
    let pipeline = SignalPipeline::new(config).context("invalid pipeline configuration")?;
    Ok(match confirmation {
        Confirmation::Reject => pipeline.with_confirmation(AlwaysReject),
        Confirmation::Always => pipeline.with_confirmation(AlwaysConfirm),
        Confirmation::Smc => pipeline.with_confirmation(SmcConfirmation::default_params()),
    })
}

fn run_scan(
    source: &Source,
    window: usize,
    store_path: Option<&Path>,
    confirmation: Confirmation,
) -> Result<()> {
    if window == 0 {
        bail!("--window must be >= 1");
    }
    let timeframe = parse_timeframe(&source.timeframe)?;
    let config = load_config(source.config.as_deref())?;
    let pipeline = build_pipeline(config, confirmation)?;

    let candles = load_candles(&source.candles)?;
    let tail = &candles[candles.len().saturating_sub(window)..];
    let reference = source.reference.as_deref().map(load_candles).transpose()?;

    let mut input = EvaluationInput::new(&source.symbol, timeframe, tail);
    if let (Some(r), Some(last)) = (reference.as_deref(), tail.last()) {
        input = input.with_reference(aligned_reference(r, last, window));
    }

    let evaluation = match store_path {
        Some(path) => {
            let mut store = JsonlSignalStore::open(path)
                .with_context(|| format!("failed to open signal store {}", path.display()))?;
            let evaluation = pipeline.run(&input, &mut store)?;
            info!(store = %store.path().display(), stored = store.len(), "signal store updated");
            evaluation
        }
        None => pipeline.run(&input, &mut InMemorySignalStore::new())?,
    };

    if evaluation.is_accepted() {
        info!(symbol = %source.symbol, reason = %evaluation.reason, "candidate accepted");
    } else {
        info!(symbol = %source.symbol, reason = %evaluation.reason, "no trade");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&evaluation).context("failed to serialize evaluation")?
    );
    Ok(())
}

fn run_backtest(
    source: &Source,
    params: &WalkForwardParams,
    confirmation: Confirmation,
    output_dir: Option<&Path>,
) -> Result<()> {
    let config = load_config(source.config.as_deref())?;
    let pipeline = build_pipeline(config, confirmation)?;
    let candles = load_candles(&source.candles)?;
    let reference = source.reference.as_deref().map(load_candles).transpose()?;

    info!(
        symbol = %params.symbol,
        candles = candles.len(),
        window = params.window,
        step = params.step,
        "starting walk-forward"
    );
    let report = walk_forward(&candles, reference.as_deref(), params, &pipeline, None)?;
    report::print_summary(&params.symbol, &report);

    if let Some(dir) = output_dir {
        let label = format!(
            "{}_{}",
            params.symbol.replace('/', "-"),
            params.timeframe.as_str()
        );
        let run_dir = report::save_artifacts(&report, dir, &label)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_config_show(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    println!("# config hash: {}", config.config_hash());
    print!("{}", config.to_toml()?);
    Ok(())
}

fn run_config_validate(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!("{}: ok (hash {})", path.display(), config.config_hash());
    Ok(())
}
