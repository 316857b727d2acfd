use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-scraper")]
#[command(about = "Ranks a website's pages and fetches the text of the most important ones")]
#[command(version)]
pub struct Args {
    /// Website to crawl (scheme optional)
    pub url: String,

    /// Maximum number of pages to return
    #[arg(short, long)]
    pub max_pages: Option<usize>,

    /// Only report whether the site can be scraped
    #[arg(long)]
    pub check: bool,

    /// Fetch only the ranked pages, never links discovered while fetching
    #[arg(long)]
    pub ranked_only: bool,

    /// Honor robots.txt rules
    #[arg(long)]
    pub respect_robots: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
