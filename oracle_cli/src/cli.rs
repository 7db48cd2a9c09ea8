use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use oracle_core::Network;

/// Blocks used when neither a date nor a count is given, about one day
pub const DEFAULT_RECENT_BLOCKS: usize = 144;

/// Command-line arguments
#[derive(Debug)]
pub struct Args {
    pub manifest: PathBuf,
    pub blocks_dir: Option<PathBuf>,
    pub hex_dir: Option<PathBuf>,
    pub date: Option<String>,
    pub recent: Option<usize>,
    pub config: Option<PathBuf>,
    pub threads: Option<usize>,
    pub points_out: Option<PathBuf>,
    pub report_out: Option<PathBuf>,
    pub network: Network,
    pub retries: usize,
    pub retry_backoff: Duration,
    pub verbose: bool,
}

impl Args {
    pub fn command() -> clap::Command {
        clap::Command::new("oracle_cli")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Estimate the USD price from round-amount outputs in raw blocks")
            .arg(
                clap::Arg::new("manifest")
                    .short('m')
                    .long("manifest")
                    .help("CSV of height,hash,time rows, ordered by height")
                    .required(true)
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("blocks-dir")
                    .short('b')
                    .long("blocks-dir")
                    .help("Node data directory holding blk*.dat files")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("hex-dir")
                    .long("hex-dir")
                    .help("Directory of <hash>.hex or <hash>.bin block dumps")
                    .num_args(1),
            )
            .group(
                clap::ArgGroup::new("source")
                    .args(["blocks-dir", "hex-dir"])
                    .required(true),
            )
            .arg(
                clap::Arg::new("date")
                    .short('d')
                    .long("date")
                    .help("UTC day to price, YYYY-MM-DD or YYYY/MM/DD")
                    .num_args(1)
                    .conflicts_with("recent"),
            )
            .arg(
                clap::Arg::new("recent")
                    .short('r')
                    .long("recent")
                    .help("Price the most recent N blocks of the manifest (default: 144)")
                    .num_args(1)
                    .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
            )
            .arg(
                clap::Arg::new("config")
                    .short('c')
                    .long("config")
                    .help("JSON object of pipeline settings")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("threads")
                    .short('t')
                    .long("threads")
                    .help("Number of decode threads, 0 for the rayon default")
                    .num_args(1)
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                clap::Arg::new("points-out")
                    .long("points-out")
                    .help("Write the price points as CSV")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("report-out")
                    .long("report-out")
                    .help("Write the full report as JSON")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("network")
                    .short('n')
                    .long("network")
                    .help("Network whose record magic the block files use")
                    .value_parser(["mainnet", "testnet", "signet", "regtest"])
                    .default_value("mainnet")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("retries")
                    .long("retries")
                    .help("Retries for a block the source cannot produce")
                    .num_args(1)
                    .default_value("2")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                clap::Arg::new("retry-backoff-ms")
                    .long("retry-backoff-ms")
                    .help("Delay before the n-th retry is n times this many milliseconds")
                    .num_args(1)
                    .default_value("0")
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(
                clap::Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Log per-block detail")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        let path = |id: &str| matches.get_one::<String>(id).map(PathBuf::from);
        Args {
            manifest: path("manifest").unwrap_or_default(),
            blocks_dir: path("blocks-dir"),
            hex_dir: path("hex-dir"),
            date: matches.get_one::<String>("date").cloned(),
            recent: matches.get_one::<usize>("recent").copied(),
            config: path("config"),
            threads: matches.get_one::<usize>("threads").copied().filter(|n| *n > 0),
            points_out: path("points-out"),
            report_out: path("report-out"),
            network: matches
                .get_one::<String>("network")
                .and_then(|n| Network::from_str(n).ok())
                .unwrap_or_default(),
            retries: matches.get_one::<usize>("retries").copied().unwrap_or(2),
            retry_backoff: Duration::from_millis(
                matches.get_one::<u64>("retry-backoff-ms").copied().unwrap_or(0),
            ),
            verbose: matches.get_flag("verbose"),
        }
    }
}

/// Validates that a count is a positive integer
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["oracle_cli"];
        argv.extend_from_slice(args);
        Args::command()
            .try_get_matches_from(argv)
            .map(|m| Args::from_matches(&m))
    }

    #[test]
    fn test_command_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_full() {
        let args = parse(&[
            "--manifest", "m.csv", "--blocks-dir", "/data/blocks", "--date", "2024-03-10",
            "--threads", "4", "--network", "signet", "--retries", "5", "--retry-backoff-ms", "250",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.manifest, PathBuf::from("m.csv"));
        assert_eq!(args.blocks_dir, Some(PathBuf::from("/data/blocks")));
        assert_eq!(args.date.as_deref(), Some("2024-03-10"));
        assert_eq!(args.threads, Some(4));
        assert_eq!(args.network, Network::Signet);
        assert_eq!(args.retries, 5);
        assert_eq!(args.retry_backoff, Duration::from_millis(250));
        assert!(args.verbose);
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-m", "m.csv", "--hex-dir", "dumps"]).unwrap();
        assert_eq!(args.network, Network::Mainnet);
        assert_eq!(args.retries, 2);
        assert_eq!(args.retry_backoff, Duration::ZERO);
        assert_eq!(args.recent, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_rejects_bad_combinations() {
        assert!(parse(&["-m", "m.csv"]).is_err());
        assert!(parse(&["-m", "m.csv", "-b", "x", "--hex-dir", "y"]).is_err());
        assert!(parse(&["-m", "m.csv", "-b", "x", "-d", "2024-01-01", "-r", "6"]).is_err());
        assert!(parse(&["-m", "m.csv", "-b", "x", "-r", "0"]).is_err());
    }

    #[test]
    fn test_zero_threads_means_rayon_default() {
        let args = parse(&["-m", "m.csv", "-b", "x", "-t", "0"]).unwrap();
        assert_eq!(args.threads, None);
    }
}
