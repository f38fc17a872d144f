//! itx: inspect raw transactions against a local ledger file.
//!
//! Resolves the outputs a transaction spends, detects embedded protocol
//! actions, validates them, and stores the result as an inspected record.

mod ledger;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use itx_core::address::Network;
use itx_core::traits::LedgerNode;
use itx_core::types::{Hash256, Transaction};
use itx_inspector::{InspectedTransaction, InspectorConfig, LogFormat, sort_by_reordering_timestamp};
use itx_protocol::EnvelopeCodec;
use tracing::{info, warn};

use crate::ledger::FileLedger;

/// Inspected transaction tool.
#[derive(Parser)]
#[command(name = "itx")]
#[command(version, about = "Resolve, inspect and store tokenized transactions")]
struct Cli {
    /// Network (mainnet or testnet). Overrides ITX_NETWORK.
    #[arg(long, global = true)]
    network: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides ITX_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json"). Overrides ITX_LOG_FORMAT.
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add raw transactions to the ledger file.
    Import(ImportArgs),
    /// Inspect a transaction and optionally store the record.
    Inspect(InspectArgs),
    /// Decode and print a stored record.
    Show(ShowArgs),
    /// Order stored records by response timestamp.
    Sort(SortArgs),
}

#[derive(Args)]
struct LedgerArg {
    /// Path to ledger file (default: <data dir>/itx/ledger.json).
    #[arg(short, long)]
    ledger: Option<PathBuf>,
}

#[derive(Args)]
struct ImportArgs {
    #[command(flatten)]
    ledger: LedgerArg,

    /// Hex-encoded raw transactions.
    #[arg(required = true)]
    raw: Vec<String>,
}

#[derive(Args)]
struct InspectArgs {
    #[command(flatten)]
    ledger: LedgerArg,

    /// Hex-encoded raw transaction.
    #[arg(long, conflicts_with = "txid", required_unless_present = "txid")]
    hex: Option<String>,

    /// Id of a transaction already in the ledger.
    #[arg(long)]
    txid: Option<String>,

    /// Write the inspected record to this file.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct ShowArgs {
    /// Record file written by `inspect --out`.
    record: PathBuf,
}

#[derive(Args)]
struct SortArgs {
    /// Record files.
    #[arg(required = true)]
    records: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(&config.log_level, config.log_format);

    match cli.command {
        Commands::Import(args) => import(args),
        Commands::Inspect(args) => inspect(args, &config),
        Commands::Show(args) => show(args, &config),
        Commands::Sort(args) => sort(args, &config),
    }
}

/// Environment configuration with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<InspectorConfig> {
    let config = InspectorConfig::from_env().map_err(anyhow::Error::msg)?;
    apply_overrides(cli, config)
}

fn apply_overrides(cli: &Cli, mut config: InspectorConfig) -> Result<InspectorConfig> {
    if let Some(network) = &cli.network {
        config.network = parse_network(network)?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.parse().map_err(anyhow::Error::msg)?;
    }
    Ok(config)
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}

fn import(args: ImportArgs) -> Result<()> {
    let ledger = open_ledger(args.ledger)?;
    for raw in &args.raw {
        let bytes = hex::decode(raw.trim()).context("Invalid transaction hex")?;
        let tx = Transaction::from_bytes(&bytes).context("Invalid transaction")?;
        ledger.save_transaction(&tx)?;
        println!("{}", tx.txid());
    }
    info!(path = %ledger.path().display(), count = args.raw.len(), "imported transactions");
    Ok(())
}

fn inspect(args: InspectArgs, config: &InspectorConfig) -> Result<()> {
    let ledger = open_ledger(args.ledger)?;
    let codec = EnvelopeCodec::new();

    let itx = match (&args.hex, &args.txid) {
        (Some(raw), _) => InspectedTransaction::from_hex(raw, &ledger, &codec, config.network),
        (None, Some(txid)) => {
            let txid = Hash256::from_hex(txid).context("Invalid txid")?;
            InspectedTransaction::from_txid(&txid, &ledger, &codec, config.network)
        }
        (None, None) => bail!("Either --hex or --txid is required"),
    }
    .context("Failed to inspect transaction")?;

    if let Some(rejection) = itx.validate() {
        warn!(code = rejection.code, text = %rejection.text, "transaction rejected");
    }

    print!("{}", itx.render(config.network));
    match itx.fee() {
        Ok(fee) => println!("  Fee: {fee} ({:.3}/byte)", itx.fee_rate().unwrap_or_default()),
        Err(e) => println!("  Fee: unavailable ({e})"),
    }

    if let Some(out) = args.out {
        fs::write(&out, itx.encode())
            .with_context(|| format!("Failed to write record: {}", out.display()))?;
        info!(path = %out.display(), txid = %itx.id(), "record saved");
    }
    Ok(())
}

fn show(args: ShowArgs, config: &InspectorConfig) -> Result<()> {
    let itx = load_record(&args.record, config.network)?;
    print!("{}", itx.render(config.network));
    Ok(())
}

fn sort(args: SortArgs, config: &InspectorConfig) -> Result<()> {
    let mut records = args
        .records
        .iter()
        .map(|path| load_record(path, config.network))
        .collect::<Result<Vec<_>>>()?;
    sort_by_reordering_timestamp(&mut records);

    for itx in &records {
        match itx.reordering_timestamp() {
            Some(ts) => println!("{ts} {}", itx.id()),
            None => println!("- {}", itx.id()),
        }
    }
    Ok(())
}

fn load_record(path: &Path, network: Network) -> Result<InspectedTransaction> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read record: {}", path.display()))?;
    InspectedTransaction::decode(&bytes, &EnvelopeCodec::new(), network)
        .with_context(|| format!("Invalid record: {}", path.display()))
}

fn open_ledger(arg: LedgerArg) -> Result<FileLedger> {
    let path = match arg.ledger {
        Some(p) => p,
        None => dirs::data_dir()
            .context("Could not determine data directory")?
            .join("itx")
            .join("ledger.json"),
    };
    FileLedger::open(&path).with_context(|| format!("Failed to open ledger: {}", path.display()))
}

/// Parse network string to Network enum.
fn parse_network(s: &str) -> Result<Network> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid network (must be 'mainnet' or 'testnet')"))
}
