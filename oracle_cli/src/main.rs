mod cli;
mod manifest;
mod output;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use oracle_core::common::time::parse_date;
use oracle_core::source::{BlkFileSource, HexDirSource, RetryingSource};
use oracle_core::{BlockRef, BlockSource, BlockWindow, Oracle, OracleConfig, OracleReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Args, DEFAULT_RECENT_BLOCKS};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => OracleConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OracleConfig::default(),
    };
    let oracle = Oracle::new(config)?;

    let blocks = manifest::load_manifest(&args.manifest)?;
    let window = match &args.date {
        Some(date) => BlockWindow::utc_day(&blocks, parse_date(date)?, oracle.calibration())?,
        None => BlockWindow::recent(&blocks, args.recent.unwrap_or(DEFAULT_RECENT_BLOCKS))?,
    };

    let source = open_source(&args)?;
    let report = run_oracle(&oracle, source.as_ref(), &window, args.threads)?;

    println!(
        "{} price: {} (deviation {:.2}%, blocks {}..={})",
        report.window,
        output::format_usd(report.final_price),
        report.deviation_pct * 100.0,
        report.first_height,
        report.last_height
    );

    if let Some(path) = &args.points_out {
        output::write_points(path, &report.price_points)?;
        info!("wrote {} price points to {}", report.price_points.len(), path.display());
    }
    if let Some(path) = &args.report_out {
        output::write_report(path, &report)?;
        info!("wrote report to {}", path.display());
    }
    Ok(())
}

fn open_source(args: &Args) -> anyhow::Result<Box<dyn BlockSource>> {
    let source: Box<dyn BlockSource> = match (&args.blocks_dir, &args.hex_dir) {
        (Some(dir), _) => Box::new(
            RetryingSource::new(BlkFileSource::open(dir, args.network)?, args.retries)
                .with_backoff(args.retry_backoff),
        ),
        (None, Some(dir)) => Box::new(
            RetryingSource::new(HexDirSource::new(dir)?, args.retries)
                .with_backoff(args.retry_backoff),
        ),
        (None, None) => anyhow::bail!("either --blocks-dir or --hex-dir is required"),
    };
    Ok(source)
}

fn run_oracle(
    oracle: &Oracle,
    source: &dyn BlockSource,
    window: &BlockWindow,
    threads: Option<usize>,
) -> anyhow::Result<OracleReport> {
    let pb = ProgressBar::new(window.blocks.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} blocks {msg}",
    )?);
    let on_block = |block: &BlockRef| {
        pb.set_message(format!("#{}", block.height));
        pb.inc(1);
    };

    let result = match threads {
        Some(n) => {
            let pool = configure_thread_pool(n)?;
            pool.install(|| oracle.run_with_progress(source, window, on_block))
        }
        None => oracle.run_with_progress(source, window, on_block),
    };
    pb.finish_and_clear();
    Ok(result?)
}

fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to build rayon thread pool")
}
