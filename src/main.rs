use anyhow::Context;
use boring_hannover::aggregator::fetch_events;
use boring_hannover::categorizer::categorize;
use boring_hannover::config::Config;
use boring_hannover::dates::now_berlin;
use boring_hannover::logging::init_logging;
use boring_hannover::notifier::{deliver_all, format_message, EventSink, LocalSink};
use boring_hannover::registry::{default_registry, SourceRegistry};
use boring_hannover::sources::EventSource;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "boring-hannover")]
#[command(about = "Weekly digest of Hannover cinema and concert listings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all sources once and write the digest
    Run {
        /// Comma-separated source ids to run (default: all)
        #[arg(long)]
        sources: Option<String>,
        /// Print the digest to stdout instead of writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// List the registered source ids
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let registry = default_registry(&config).context("building source registry")?;

    match cli.command.unwrap_or(Commands::Run { sources: None, dry_run: false }) {
        Commands::Sources => {
            for source in registry.all() {
                println!("{} ({})", source.source_id(), source.source_type().as_str());
            }
            Ok(())
        }
        Commands::Run { sources, dry_run } => run(&config, &registry, sources, dry_run).await,
    }
}

async fn run(
    config: &Config,
    registry: &SourceRegistry,
    source_filter: Option<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let sources = select_sources(registry, source_filter.as_deref());
    anyhow::ensure!(!sources.is_empty(), "no sources selected");

    info!(count = sources.len(), "starting batch run");
    let events = fetch_events(&sources, config).await;

    let buckets = categorize(events, now_berlin(), config.movies_lookahead_days);
    info!(
        movies = buckets.movies_this_week.len(),
        radar = buckets.big_events_radar.len(),
        "categorized events"
    );

    if dry_run {
        println!("{}", format_message(&buckets));
        return Ok(());
    }

    let sinks: Vec<Box<dyn EventSink>> = vec![Box::new(LocalSink::new(config))];
    deliver_all(&sinks, &buckets)
        .await
        .context("delivering digest")?;

    Ok(())
}

/// Resolve the `--sources` filter against the registry; unknown ids are
/// logged and skipped rather than failing the run.
fn select_sources<'a>(
    registry: &'a SourceRegistry,
    filter: Option<&str>,
) -> Vec<&'a dyn EventSource> {
    match filter {
        None => registry.all().collect(),
        Some(filter) => filter
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter_map(|id| {
                let source = registry.get(id);
                if source.is_none() {
                    warn!(source = id, "unknown source id in --sources, skipping");
                }
                source
            })
            .collect(),
    }
}
