//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest site content
//! harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_harvest::config::{load_config, resolve_exclusions, validate, Config, CrawlConfig};
use sumi_harvest::crawler::{CrawlEngine, CrawlEvent, CrawlOutput};
use sumi_harvest::output::{format_markdown, print_statistics, write_exports};
use sumi_harvest::QueryPolicy;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: A polite single-site content harvester
///
/// Sumi-Harvest crawls one website while respecting robots.txt and a
/// politeness delay, reduces every page to clean Markdown, drops duplicate
/// pages, and classifies the layout of each page section.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-site content harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Site to crawl (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of pages to fetch
    #[arg(long)]
    max_pages: Option<u32>,

    /// Delay between requests in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Ignore robots.txt
    #[arg(long)]
    no_robots: bool,

    /// Fetch only the given URL, without following links
    #[arg(long)]
    single_page: bool,

    /// Skip URLs whose path contains this substring (repeatable)
    #[arg(long, value_name = "SUBSTR")]
    exclude: Vec<String>,

    /// Exclusion preset: ecommerce, user-areas, languages, blog-news (repeatable)
    #[arg(long, value_name = "NAME")]
    preset: Vec<String>,

    /// How query strings are treated
    #[arg(long, value_enum)]
    query_strings: Option<QueryArg>,

    /// Write the Markdown export here
    #[arg(long, value_name = "PATH")]
    markdown: Option<String>,

    /// Write the section-structured Markdown export here
    #[arg(long, value_name = "PATH")]
    structured: Option<String>,

    /// Write the JSON export here
    #[arg(long, value_name = "PATH")]
    json: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum QueryArg {
    Strip,
    Reject,
    Keep,
}

impl From<QueryArg> for QueryPolicy {
    fn from(arg: QueryArg) -> Self {
        match arg {
            QueryArg::Strip => QueryPolicy::Strip,
            QueryArg::Reject => QueryPolicy::Reject,
            QueryArg::Keep => QueryPolicy::Keep,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => {
            let url = cli
                .url
                .as_deref()
                .context("either a CONFIG file or --url is required")?;
            Config {
                crawl: CrawlConfig::new(url),
                extraction: Default::default(),
                output: Default::default(),
            }
        }
    };

    let crawl = &mut config.crawl;
    if let Some(url) = &cli.url {
        crawl.base_url = url.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        crawl.max_pages = max_pages;
    }
    if let Some(delay) = cli.delay {
        crawl.request_delay = delay;
    }
    if let Some(query_strings) = cli.query_strings {
        crawl.query_strings = query_strings.into();
    }
    if cli.no_robots {
        crawl.respect_robots = false;
    }
    if cli.single_page {
        crawl.single_page_mode = true;
    }
    crawl.exclude_paths.extend(cli.exclude.iter().cloned());
    crawl.exclude_presets.extend(cli.preset.iter().cloned());

    let output = &mut config.output;
    if cli.markdown.is_some() {
        output.markdown_path = cli.markdown.clone();
    }
    if cli.structured.is_some() {
        output.structured_path = cli.structured.clone();
    }
    if cli.json.is_some() {
        output.json_path = cli.json.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let crawl = &config.crawl;
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Crawl Configuration:");
    println!("  Base URL: {}", crawl.base_url);
    println!("  Page budget: {}", crawl.effective_max_pages());
    println!("  Request delay: {}ms", crawl.request_delay);
    println!("  Respect robots.txt: {}", crawl.respect_robots);
    println!("  Single page mode: {}", crawl.single_page_mode);
    println!("  Query strings: {:?}", crawl.query_strings);
    println!("  User agent: {}", crawl.user_agent);

    let exclusions = resolve_exclusions(&crawl.exclude_paths, &crawl.exclude_presets)?;
    println!("\nExcluded Path Substrings ({}):", exclusions.len());
    for exclusion in &exclusions {
        println!("  - {}", exclusion);
    }

    println!("\nExtraction:");
    println!(
        "  Minimum content length: {} chars",
        config.extraction.min_content_length
    );
    println!(
        "  Minimum paragraph words: {}",
        config.extraction.min_paragraph_words
    );
    println!(
        "  Minimum section length: {} chars",
        config.extraction.min_section_length
    );

    println!("\nOutput:");
    let output = &config.output;
    for (label, path) in [
        ("Markdown", &output.markdown_path),
        ("Structured", &output.structured_path),
        ("JSON", &output.json_path),
    ] {
        println!("  {}: {}", label, path.as_deref().unwrap_or("-"));
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let mut engine = CrawlEngine::from_config(&config)?.with_events(sender);

    let stop = engine.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            stop.stop();
        }
    });

    let reporter = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            log_event(&event);
        }
    });

    let result = engine.run().await;

    // Dropping the engine closes the event channel so the reporter can finish
    drop(engine);
    reporter.await.context("progress reporter panicked")?;

    let output = result.context("crawl failed")?;
    report(&config, &output)
}

fn log_event(event: &CrawlEvent) {
    match event {
        CrawlEvent::Started {
            base_url,
            max_pages,
        } => tracing::info!("Crawling {} (up to {} pages)", base_url, max_pages),
        CrawlEvent::Progress {
            processed,
            saved,
            queue,
            fraction,
        } => tracing::info!(
            "Progress: {:.0}% ({} processed, {} saved, {} queued)",
            fraction * 100.0,
            processed,
            saved,
            queue
        ),
        CrawlEvent::Skipped { url, reason } => tracing::debug!("Skipped {} ({})", url, reason),
        CrawlEvent::RobotsUnavailable { robots_url, error } => {
            tracing::warn!("robots.txt unavailable at {}: {}", robots_url, error)
        }
        CrawlEvent::Finished {
            state,
            processed,
            saved,
        } => tracing::info!(
            "Crawl {}: {} processed, {} saved",
            state,
            processed,
            saved
        ),
    }
}

/// Writes the exports (or prints Markdown when none are configured)
fn report(config: &Config, output: &CrawlOutput) -> anyhow::Result<()> {
    let written = write_exports(output, &config.output).context("failed to write exports")?;

    if written.is_empty() {
        print!("{}", format_markdown(output, &chrono::Local::now()));
        return Ok(());
    }

    for path in &written {
        println!("✓ Export written to: {}", path.display());
    }
    println!();
    print_statistics(&output.stats);

    for warning in &output.warnings {
        println!("⚠ {}", warning);
    }

    Ok(())
}
