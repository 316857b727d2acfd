use clap::Parser;
use site_scraper::{CrawlerConfig, FetchScope, ScrapeError, Scraper};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ScrapeError> {
    let mut config = match &args.config {
        Some(path) => CrawlerConfig::from_file(path)?,
        None => CrawlerConfig::default(),
    };
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }
    if args.ranked_only {
        config.fetch_scope = FetchScope::RankedOnly;
    }
    if args.respect_robots {
        config.respect_robots = true;
    }

    let scraper = Scraper::new(config)?;

    if args.check {
        let report = scraper.check(&args.url).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let start_time = std::time::Instant::now();
    let pages = scraper.scrape(&args.url).await?;
    ::log::info!(
        "Crawling complete - fetched {} pages in {:.2} seconds",
        pages.len(),
        start_time.elapsed().as_secs_f64()
    );

    println!("{}", serde_json::to_string_pretty(&pages)?);
    Ok(())
}
