mod catalog;
mod config;
mod output;
mod parse;
mod prompt;
mod session;
mod simulate;

use anyhow::Context;
use clap::Parser;
use reqwest::Client;
use songrank_core::{EngineConfig, EngineError, RankingEngine, SearchMode, View};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::catalog::{Catalog, Shuffle};
use crate::session::SessionEnd;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "songrank", version, about = "Rank an artist's songs one pairwise choice at a time")]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Rank songs interactively
    Rank(RankArgs),
    /// Measure the search modes against a hidden reference order
    Simulate(SimulateArgs),
    /// Create a default config file at ~/.config/songrank/config.toml
    Init {
        /// Where to write the config (default: ~/.config/songrank/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Parser)]
struct RankArgs {
    /// Artist whose songs are fetched from the iTunes catalog
    #[arg(long)]
    artist: Option<String>,

    /// Local catalog file instead of the iTunes catalog (JSON catalog,
    /// JSON array of names, or one "Song | Album" per line)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Maximum number of songs to rank (default: 10)
    #[arg(long)]
    limit: Option<usize>,

    /// iTunes Search API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Insertion search: "bounds" or "strict"
    #[arg(long)]
    search: Option<String>,

    /// Seed for a repeatable song order
    #[arg(long)]
    seed: Option<u64>,

    /// Keep catalog order instead of shuffling
    #[arg(long)]
    no_shuffle: bool,

    /// Output JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Also print shareable plain-text rankings
    #[arg(long)]
    share: bool,

    /// Write shareable plain-text rankings to this file
    #[arg(long)]
    share_to: Option<PathBuf>,

    /// Path to config file (default: ~/.config/songrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Songs per trial
    #[arg(long, default_value_t = 20)]
    items: usize,

    /// Number of trials per search mode
    #[arg(long, default_value_t = 100)]
    trials: usize,

    /// Only run this search mode ("bounds" or "strict")
    #[arg(long)]
    search: Option<String>,

    /// RNG seed (default: random)
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_search_mode(value: Option<&str>) -> SearchMode {
    match value {
        None => SearchMode::default(),
        Some(s) => s.parse().unwrap_or_else(|e: String| bail(e)),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Rank(args) => run_rank(args).await,
        Commands::Simulate(args) => run_simulate(args),
        Commands::Init { config: path } => {
            let path = path.unwrap_or_else(config::config_path);
            config::create_default_config(&path);
            println!("Created config at {}", path.display());
            println!("Edit it to set your default artist, song limit, etc.");
        }
    }
}

async fn run_rank(args: RankArgs) {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let search = parse_search_mode(args.search.as_deref().or(cfg.search.as_deref()));
    let limit = config::resolve_limit(args.limit, cfg.limit);
    if limit == 0 {
        bail("--limit must be at least 1");
    }
    let shuffle = if args.no_shuffle || cfg.shuffle == Some(false) {
        Shuffle::Off
    } else {
        match args.seed.or(cfg.seed) {
            Some(seed) => Shuffle::Seeded(seed),
            None => Shuffle::Random,
        }
    };

    let (label, catalog) = match (&args.catalog, args.artist.clone().or(cfg.artist)) {
        (Some(path), _) => {
            let catalog = catalog::load_file(path).unwrap_or_else(|e| bail(format!("{e:#}")));
            (catalog_label(path), catalog)
        }
        (None, Some(artist)) => {
            let endpoint = args
                .endpoint
                .clone()
                .or(cfg.endpoint)
                .unwrap_or_else(|| catalog::DEFAULT_ENDPOINT.to_string());
            eprintln!("Fetching songs by {artist}...");
            let catalog = catalog::fetch_artist(&Client::new(), &endpoint, &artist)
                .await
                .unwrap_or_else(|e| bail(format!("{e:#}")));
            (artist, catalog)
        }
        (None, None) => bail(format!(
            "No songs to rank. Pass --artist or --catalog, or set artist in {}",
            config_path.display()
        )),
    };

    let Catalog { collections, items } = catalog;
    let available = items.len();
    let items = catalog::prepare(items, shuffle, Some(limit));
    info!(available, selected = items.len(), albums = collections.len(), ?search, "catalog ready");

    let mut engine = RankingEngine::new(EngineConfig { search });
    match engine.initialize(items, collections) {
        Ok(()) => {}
        Err(EngineError::EmptyInput) => bail(format!("No songs found for {label}")),
        Err(e) => bail(format!("Cannot rank {label}: {e}")),
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let end = session::run_session(&mut engine, stdin.lock(), &mut stdout)
        .unwrap_or_else(|e| bail(format!("Terminal I/O failed: {e}")));

    if let SessionEnd::Stopped { placed, total } = end {
        eprintln!("Stopped with {placed} of {total} songs placed.");
        return;
    }

    let View::Complete { ranked, collection_ranking } = engine.current_state() else {
        bail("Ranking ended without completing");
    };
    let names = output::album_names(engine.collections());

    if args.json {
        let json = output::render_json(ranked, collection_ranking, &names)
            .unwrap_or_else(|e| bail(format!("Failed to encode JSON: {e}")));
        println!("{json}");
    } else {
        println!("\n{}", output::render_table(ranked, collection_ranking, &names));
    }

    let share = output::share_text(&label, ranked, collection_ranking);
    if args.share {
        println!("{share}");
    }
    if let Some(path) = &args.share_to {
        write_share(path, &share).unwrap_or_else(|e| bail(format!("{e:#}")));
        eprintln!("Saved rankings to {}", path.display());
    }
}

fn catalog_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_share(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write rankings to {}", path.display()))
}

fn run_simulate(args: SimulateArgs) {
    if args.items == 0 {
        bail("--items must be at least 1");
    }
    if args.trials == 0 {
        bail("--trials must be at least 1");
    }
    let seed = args.seed.unwrap_or_else(rand::random);
    let modes = match args.search.as_deref() {
        Some(_) => vec![parse_search_mode(args.search.as_deref())],
        None => vec![SearchMode::Bounds, SearchMode::Strict],
    };
    if args.items > 2000 {
        warn!(items = args.items, "large simulations count inversions quadratically");
    }
    info!(items = args.items, trials = args.trials, seed, "running simulation");

    let reports: Vec<_> = modes
        .into_iter()
        .map(|mode| simulate::simulate(args.items, args.trials, mode, seed))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| bail(format!("Simulation failed: {e}")));

    if args.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => bail(format!("Failed to encode JSON: {e}")),
        }
    } else {
        simulate::print_reports(&reports);
        println!("\nSeed: {seed}");
    }
}
