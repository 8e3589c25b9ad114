//! bizdir-dedup command line tool
//!
//! ```bash
//! bizdir-dedup find --input seed.json --output duplicates_report.json
//! bizdir-dedup clean --input seed.json --renumber
//! bizdir-dedup remove --input seed.json --report duplicates_report.json --log removed.json
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bizdir_dedup::io::{backup_file, load_batch, save_batch, write_json};
use bizdir_dedup::{
    apply_removals, merge_exact_address_duplicates, DedupConfig, DuplicateReport,
    DuplicateResolver,
};
use bizdir_domain::{renumber_ids, validate_record, RecordId, ValidationSeverity};

/// Find and remove duplicate business listings
#[derive(Parser, Debug)]
#[command(name = "bizdir-dedup", version, about)]
struct Cli {
    /// Engine configuration (.toml or .json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a batch and report likely duplicates
    Find(FindArgs),
    /// Collapse records that share an identical address
    Clean(CleanArgs),
    /// Remove confirmed duplicates from a batch
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
struct FindArgs {
    /// Record batch (JSON array)
    #[arg(long, short)]
    input: PathBuf,

    /// Write the JSON report here
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Keep one record per connected group of findings
    #[arg(long)]
    cluster: bool,
}

#[derive(Args, Debug)]
struct CleanArgs {
    #[arg(long, short)]
    input: PathBuf,

    /// Defaults to overwriting the input
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Reassign ids from 1 after cleaning
    #[arg(long)]
    renumber: bool,
}

#[derive(Args, Debug)]
struct RemoveArgs {
    #[arg(long, short)]
    input: PathBuf,

    /// Remove the ids suggested by a `find` report
    #[arg(long, conflicts_with = "ids", required_unless_present = "ids")]
    report: Option<PathBuf>,

    /// Comma-separated ids to remove
    #[arg(long, value_delimiter = ',')]
    ids: Vec<RecordId>,

    /// Defaults to overwriting the input
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Backup of the original batch; defaults to `<input>.backup` when overwriting
    #[arg(long, value_name = "FILE")]
    backup: Option<PathBuf>,

    /// Write the removal log here
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Find(args) => find(config, args),
        Command::Clean(args) => clean(args),
        Command::Remove(args) => remove(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<DedupConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(DedupConfig::default());
    };
    let content = fs::read_to_string(path)?;
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => DedupConfig::from_toml(&content)?,
        _ => DedupConfig::from_json(&content)?,
    };
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

fn find(mut config: DedupConfig, args: FindArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.cluster {
        config.resolution.cluster_findings = true;
    }
    let resolver = DuplicateResolver::new(config)?;

    let records = load_batch(&args.input)?;
    info!(records = records.len(), "loaded {}", args.input.display());

    for record in &records {
        for issue in validate_record(record) {
            if issue.severity == ValidationSeverity::Warning {
                warn!(id = record.id, field = %issue.field, "{}", issue.message);
            }
        }
    }

    let resolution = resolver.find_duplicates(&records);
    let report = DuplicateReport::build(&records, &resolution);
    print!("{report}");

    if let Some(output) = &args.output {
        write_json(output, &report)?;
        info!("report saved to {}", output.display());
    }
    Ok(())
}

fn clean(args: CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_batch(&args.input)?;
    let original_count = records.len();

    let mut outcome = merge_exact_address_duplicates(records);
    for merge in &outcome.merges {
        info!(
            address = %merge.address,
            kept = %merge.survivor_name,
            removed = merge.removed.len(),
            "deduplicated address"
        );
    }
    if args.renumber {
        renumber_ids(&mut outcome.records);
    }

    let output = args.output.as_ref().unwrap_or(&args.input);
    save_batch(output, &outcome.records)?;

    println!("Before:  {original_count} businesses");
    println!("After:   {} businesses", outcome.records.len());
    println!("Removed: {} duplicates", outcome.removed_count);
    Ok(())
}

fn remove(args: RemoveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let removals: BTreeMap<RecordId, String> = match &args.report {
        Some(path) => DuplicateReport::from_json(&fs::read_to_string(path)?)?.removal_reasons(),
        None => args
            .ids
            .iter()
            .map(|&id| (id, "removed by request".to_string()))
            .collect(),
    };

    let records = load_batch(&args.input)?;
    let output = args.output.as_ref().unwrap_or(&args.input);

    let backup = match &args.backup {
        Some(path) => Some(path.clone()),
        None if output == &args.input => {
            Some(PathBuf::from(format!("{}.backup", args.input.display())))
        }
        None => None,
    };
    if let Some(backup) = &backup {
        backup_file(&args.input, backup)?;
        info!("backup saved to {}", backup.display());
    }

    let (kept, log) = apply_removals(records, &removals);
    save_batch(output, &kept)?;

    if let Some(log_path) = &args.log {
        write_json(log_path, &log)?;
        info!("removal log saved to {}", log_path.display());
    }

    println!("Original count: {}", log.original_count);
    println!("Removed:        {}", log.removed_count);
    println!("New count:      {}", log.new_count);
    Ok(())
}
