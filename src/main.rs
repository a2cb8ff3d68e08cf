use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docsift::config::{Backend, Config, DriverConfig, HeuristicConfig};
use docsift::crawl::{BatchCrawler, markdown};
use docsift::driver::{Driver, HttpSessionFactory, SessionFactory};
use docsift::fetcher::Fetcher;
use docsift::search::{PageSearch, SearchProvider};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[command(name = "docsift", version, about = "Pull readable text out of documentation pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pages crawled at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Maximum number of search results
    #[arg(long, global = true, default_value_t = 10)]
    limit: usize,

    /// Log extraction details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List search results as JSON
    Search { item: String },
    /// Extract a single page
    Get { url: String },
    /// Search, crawl every result and print a markdown dump
    Dump { item: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose && let Ok(directive) = "docsift=debug".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?.with_overrides(cli.backend, cli.concurrency);
    let heuristics = Arc::new(HeuristicConfig::default());

    match config.backend() {
        Backend::Http => {
            let fetcher = Fetcher::new(config.user_agent(), FETCH_TIMEOUT)?;
            let factory = Arc::new(HttpSessionFactory::new(fetcher));
            // Nothing renders without scripts, so settle delays buy nothing.
            let driver = Driver::new(DriverConfig::without_delays(), heuristics);
            execute(cli.command, cli.limit, &config, factory, driver).await
        }
        #[cfg(feature = "chrome")]
        Backend::Chrome => {
            let factory = Arc::new(docsift::driver::ChromeSessionFactory::launch().await?);
            let driver = Driver::new(DriverConfig::default(), heuristics);
            execute(cli.command, cli.limit, &config, factory, driver).await
        }
        #[cfg(not(feature = "chrome"))]
        Backend::Chrome => bail!("the chrome backend needs a build with `--features chrome`"),
    }
}

async fn execute<F>(
    command: Command,
    limit: usize,
    config: &Config,
    factory: Arc<F>,
    driver: Driver,
) -> Result<()>
where
    F: SessionFactory + 'static,
{
    let search = PageSearch::new(
        Arc::clone(&factory),
        config.search_url(),
        config.result_selector(),
    );
    let crawler = BatchCrawler::new(factory, Arc::new(driver), config.concurrency());

    match command {
        Command::Search { item } => {
            let results = search.search(&item, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Get { url } => {
            let outcome = crawler
                .crawl_one(&url)
                .await
                .with_context(|| format!("could not extract {url}"))?;
            println!("{}", outcome.content);
        }
        Command::Dump { item } => {
            let results = search.search(&item, limit).await?;
            if results.is_empty() {
                bail!("no search results for '{item}'");
            }
            let reports = crawler.crawl_all(results).await;
            print!("{}", markdown::assemble(&item, &reports));
        }
    }
    Ok(())
}
