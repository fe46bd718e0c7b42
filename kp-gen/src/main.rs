#![deny(
    // Strict on purpose: anything that trips these gets an inline allow, which flags it for a second look in review.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]
//! Command-line front end for the kp-gen path tools.
//!
//! Reads networks and demand sets from JSON files, runs the k-shortest-paths engine or one of the
//! design helpers on them and prints JSON to stdout (or to `--output`).
//! See binary --help for more information

use std::path::{
    Path,
    PathBuf,
};
use std::time::Duration;

use anyhow::Result;
use clap::{
    Args,
    Parser,
    Subcommand,
};
use kp_core::errors::{
    error_chain,
    Context,
    EmptyResult,
};
use kp_gen::design::{
    candidate_paths,
    path_reports,
    random_demands,
    randomize_capacity,
    DemandConfig,
};
use kp_gen::model::{
    demands_from_records,
    demands_to_records,
    paths_to_bundles,
    Demand,
    PathReport,
};
use kp_gen::network::{
    DEFAULT_CAPACITY_KEY,
    DEFAULT_WEIGHT_KEY,
};
use kp_gen::utils::{
    load_network,
    read_json,
    save_network,
    write_json,
};
use kp_gen::{
    SearchLimits,
    YenEngine,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{
    error,
    info,
    instrument,
};

/// kp-gen command-line interface: ranked loopless paths and network design problem setup
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity level (`trace`, `debug`, `info`, `warn`, `error`); `RUST_LOG` overrides.
    #[arg(short, long, default_value = "info", global = true)]
    verbosity: String,

    /// What to do.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Print the k shortest loopless paths between two nodes.
    Paths(PathsArgs),
    /// Generate candidate paths for every demand in a demand file.
    Candidates(CandidatesArgs),
    /// Generate a random demand file for a network.
    Demands(DemandsArgs),
    /// Overwrite link capacities with random integers.
    RandomizeCapacity(RandomizeCapacityArgs),
}

/// Arguments for `paths`.
#[derive(Debug, Args)]
struct PathsArgs {
    /// Network file.
    #[arg(short, long)]
    network: PathBuf,

    /// First node of every path.
    #[arg(short, long)]
    source: String,

    /// Last node of every path.
    #[arg(short, long)]
    target: String,

    /// Number of paths to produce (fewer if fewer loopless paths exist).
    #[arg(short, default_value_t = 3, value_parser = parse_path_count)]
    k: usize,

    /// Link attribute used as weight.
    #[arg(long, default_value = DEFAULT_WEIGHT_KEY)]
    weight_key: String,

    /// Link attribute reported as bottleneck capacity.
    #[arg(long)]
    capacity_key: Option<String>,

    /// Give up after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Bound on pending candidates; the most expensive ones are dropped beyond it.
    #[arg(long)]
    max_candidates: Option<usize>,
}

/// Arguments for `candidates`.
#[derive(Debug, Args)]
struct CandidatesArgs {
    /// Network file.
    #[arg(short, long)]
    network: PathBuf,

    /// Demand file: a list of `{source, target, volume}` records.
    #[arg(short, long)]
    demands: PathBuf,

    /// Candidate paths per demand.
    #[arg(short, default_value_t = 3, value_parser = parse_path_count)]
    k: usize,

    /// Link attribute used as weight.
    #[arg(long, default_value = DEFAULT_WEIGHT_KEY)]
    weight_key: String,

    /// Print path reports (cost and, with this key, capacity) instead of path bundles.
    #[arg(long)]
    reports: bool,

    /// Link attribute reported as capacity with `--reports`.
    #[arg(long)]
    capacity_key: Option<String>,

    /// Output file; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments for `demands`.
#[derive(Debug, Args)]
struct DemandsArgs {
    /// Network file; demands run between its nodes.
    #[arg(short, long)]
    network: PathBuf,

    /// Number of demand pairs.
    #[arg(short, long)]
    pairs: usize,

    /// Smallest demand volume.
    #[arg(long, default_value_t = 1.0)]
    low: f64,

    /// Largest demand volume (exclusive).
    #[arg(long)]
    high: f64,

    /// Random seed, for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Output file; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments for `randomize-capacity`.
#[derive(Debug, Args)]
struct RandomizeCapacityArgs {
    /// Network file.
    #[arg(short, long)]
    network: PathBuf,

    /// Smallest capacity.
    #[arg(long)]
    min: u32,

    /// Largest capacity (exclusive).
    #[arg(long)]
    max: u32,

    /// Link attribute to overwrite.
    #[arg(long, default_value = DEFAULT_CAPACITY_KEY)]
    capacity_key: String,

    /// Random seed, for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Output file; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Custom parser for path counts to reject zero
fn parse_path_count(s: &str) -> Result<usize, String> {
    let val: usize = s.parse().map_err(|_| format!("'{s}' isn't a valid path count"))?;
    if val == 0 {
        Err("at least one path must be requested".to_owned())
    } else {
        Ok(val)
    }
}

/// Seeded generator when a seed is given, entropy-seeded otherwise.
fn make_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Runs the k-shortest-paths engine and prints one report per path.
#[instrument(skip_all, fields(source = %args.source, target = %args.target, k = args.k))]
fn paths(args: &PathsArgs) -> EmptyResult {
    let network = load_network(&args.network)?;

    let mut limits = SearchLimits::max_paths(args.k);
    if let Some(ms) = args.timeout_ms {
        limits = limits.with_timeout(Duration::from_millis(ms));
    }
    if let Some(max) = args.max_candidates {
        limits = limits.with_max_candidates(max);
    }

    let engine = YenEngine::new(
        &network,
        args.source.clone(),
        args.target.clone(),
        &args.weight_key,
        args.capacity_key.as_deref(),
    )?
    .with_limits(limits);

    let reports = engine.map(|path| path.map(PathReport::from)).collect::<Result<Vec<_>, _>>()?;
    info!(paths = reports.len(), "path search complete");
    write_json(&reports, None)
}

/// Builds candidate paths for a demand file.
#[instrument(skip_all, fields(k = args.k))]
fn candidates(args: &CandidatesArgs) -> EmptyResult {
    let network = load_network(&args.network)?;
    let records: Vec<Demand<String>> = read_json(&args.demands)?;
    let demands = demands_from_records(records);

    let candidates = candidate_paths(&network, &demands, args.k, &args.weight_key)?;
    if args.reports {
        let reports = path_reports(&network, &candidates, &args.weight_key, args.capacity_key.as_deref())?;
        write_json(&reports, args.output.as_deref())
    } else {
        write_json(&paths_to_bundles(&candidates), args.output.as_deref())
    }
}

/// Draws a random demand set over the network's nodes.
#[instrument(skip_all, fields(pairs = args.pairs))]
fn demands(args: &DemandsArgs) -> EmptyResult {
    let network = load_network(&args.network)?;
    let nodes: Vec<String> = network.nodes().cloned().collect();
    let config = DemandConfig { pairs: args.pairs, low: args.low, high: args.high, directed: network.is_directed() };

    let demands = random_demands(&nodes, &config, &mut make_rng(args.seed))?;
    write_json(&demands_to_records(&demands), args.output.as_deref())
}

/// Rewrites a network file with random link capacities.
#[instrument(skip_all, fields(min = args.min, max = args.max))]
fn randomize(args: &RandomizeCapacityArgs) -> EmptyResult {
    let mut network = load_network(&args.network)?;
    randomize_capacity(&mut network, args.min, args.max, &args.capacity_key, &mut make_rng(args.seed))?;
    save_network(&network, args.output.as_deref())
}

/// Dispatches to the selected subcommand.
fn run(command: &Command) -> EmptyResult {
    match command {
        Command::Paths(args) => paths(args).context("paths"),
        Command::Candidates(args) => candidates(args).context("candidates"),
        Command::Demands(args) => demands(args).context("demands"),
        Command::RandomizeCapacity(args) => randomize(args).context("randomize-capacity"),
    }
}

/// Path of an input file, for log lines.
fn input_of(command: &Command) -> &Path {
    match command {
        Command::Paths(PathsArgs { network, .. })
        | Command::Candidates(CandidatesArgs { network, .. })
        | Command::Demands(DemandsArgs { network, .. })
        | Command::RandomizeCapacity(RandomizeCapacityArgs { network, .. }) => network.as_path(),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Conform to crate-standard logging.
    kp_core::logging::setup(&args.verbosity);
    info!("Reading network from {}", input_of(&args.command).display());

    run(&args.command).inspect_err(|err| error!("{}", error_chain(err)))
}

#[cfg(test)]
mod tests {
    use kp_gen::model::PathBundle;
    use kp_gen::network::{
        Link,
        Network,
    };
    use rstest::*;

    use super::*;

    #[fixture]
    fn network_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        let mut network = Network::undirected();
        for (a, b, w) in [("A", "B", 1.0), ("A", "C", 5.0), ("B", "C", 1.0), ("B", "D", 4.0), ("C", "D", 1.0)] {
            network.add_link(a.to_owned(), b.to_owned(), Link::weighted(w).with(DEFAULT_CAPACITY_KEY, 10.0));
        }
        save_network(&network, Some(path.as_path())).unwrap();
        (dir, path)
    }

    #[rstest]
    fn test_parse_paths_command() {
        let cli = Cli::try_parse_from(["kp-gen", "-v", "debug", "paths", "-n", "net.json", "-s", "A", "-t", "D", "-k", "5"])
            .unwrap();
        assert_eq!(cli.verbosity, "debug");
        let Command::Paths(args) = cli.command else {
            panic!("expected the paths subcommand");
        };
        assert_eq!((args.source.as_str(), args.target.as_str(), args.k), ("A", "D", 5));
        assert_eq!(args.weight_key, DEFAULT_WEIGHT_KEY);
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-2")]
    #[case::word("many")]
    fn test_parse_rejects_bad_path_count(#[case] k: &str) {
        assert!(Cli::try_parse_from(["kp-gen", "paths", "-n", "net.json", "-s", "A", "-t", "D", "-k", k]).is_err());
    }

    #[rstest]
    fn test_candidates_end_to_end(network_file: (tempfile::TempDir, PathBuf)) {
        let (dir, network) = network_file;
        let demands = dir.path().join("demands.json");
        let output = dir.path().join("bundles.json");
        write_json(&serde_json::json!([{"source": "A", "target": "D", "demand": 2.0}]), Some(demands.as_path())).unwrap();

        let cli = Cli::try_parse_from([
            "kp-gen",
            "candidates",
            "-n",
            network.to_str().unwrap(),
            "-d",
            demands.to_str().unwrap(),
            "-k",
            "2",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(&cli.command).unwrap();

        let bundles: Vec<PathBundle<String>> = read_json(&output).unwrap();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].paths, vec![vec!["A", "B", "C", "D"], vec!["A", "B", "D"]]);
    }

    #[rstest]
    fn test_demands_and_capacity_end_to_end(network_file: (tempfile::TempDir, PathBuf)) {
        let (dir, network) = network_file;
        let demands = dir.path().join("demands.json");
        let rewritten = dir.path().join("net2.json");

        let cli = Cli::try_parse_from([
            "kp-gen", "demands", "-n", network.to_str().unwrap(), "-p", "4", "--high", "3", "--seed", "9", "-o",
            demands.to_str().unwrap(),
        ])
        .unwrap();
        run(&cli.command).unwrap();
        let records: Vec<Demand<String>> = read_json(&demands).unwrap();
        assert_eq!(records.len(), 4);

        let cli = Cli::try_parse_from([
            "kp-gen", "randomize-capacity", "-n", network.to_str().unwrap(), "--min", "1", "--max", "2", "--seed",
            "9", "-o", rewritten.to_str().unwrap(),
        ])
        .unwrap();
        run(&cli.command).unwrap();
        let network = load_network(&rewritten).unwrap();
        assert!(network.links().all(|(_, _, link)| link.get(DEFAULT_CAPACITY_KEY) == Some(1.0)));
    }

    #[rstest]
    fn test_unknown_node_is_reported(network_file: (tempfile::TempDir, PathBuf)) {
        let (_dir, network) = network_file;
        let cli = Cli::try_parse_from(["kp-gen", "paths", "-n", network.to_str().unwrap(), "-s", "A", "-t", "Z"]).unwrap();
        let err = run(&cli.command).unwrap_err();
        assert!(error_chain(&err).starts_with("paths: invalid endpoints"), "{err:#}");
    }
}
