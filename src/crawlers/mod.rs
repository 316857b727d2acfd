pub mod content;
pub mod context;
pub mod fetcher;
pub mod ranker;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use content::ContentFetcher;
pub use context::{CrawlContext, PageInfo};
pub use fetcher::{FetchedDocument, Fetcher, HttpFetcher};
pub use ranker::{PageRanker, ScoredPage};
pub use scheduler::ChunkScheduler;
