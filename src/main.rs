use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::info;

use aebgroup::exif::ExiftoolReader;
use aebgroup::extract::extract_records;
use aebgroup::group::{build_groups, GroupConfig, DEFAULT_MAX_GAP_SECS};
use aebgroup::output;
use aebgroup::scan::candidate_files;

/// Group a directory's photos into auto exposure bracketing (AEB) bursts.
#[derive(Debug, Parser)]
#[command(name = "aebgroup", version, about)]
struct Cli {
    /// The directory with image files to group
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Allow N extractions at once; defaults to the number of processor cores
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Include RAW files
    #[arg(short = 'R', long = "with-raw")]
    with_raw: bool,

    /// Output the result as JSON, otherwise as text
    #[arg(long)]
    json: bool,

    /// Maximum seconds between consecutive frames of one burst
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_MAX_GAP_SECS)]
    gap: i64,

    /// Raise verbosity level (can be given more than once)
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let start = Instant::now();
    let jobs = cli.jobs.unwrap_or_else(default_jobs);

    let paths = candidate_files(&cli.dir, cli.with_raw)?;
    info!(
        count = paths.len(),
        jobs,
        "investigating {}",
        cli.dir.display()
    );

    let reader = ExiftoolReader::new()?;
    let records = extract_records(&reader, &paths, jobs)?;
    let groups = build_groups(records, &GroupConfig::with_max_gap_secs(cli.gap));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        output::render_json(&groups, &mut out)?;
    } else {
        output::render_text(&groups, &mut out)?;
    }

    info!(
        groups = groups.len(),
        "processing took {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
