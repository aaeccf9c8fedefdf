mod crawler;
mod mapper;

pub use crawler::{CategoryCrawler, CrawlOptions};
pub use mapper::{ItemMapper, MappedPage};
