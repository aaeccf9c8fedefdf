use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::browser::{BrowserSession, DetailNavigator};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Category, ItemRecord, LabelSchema};
use crate::parsers::parse_listing;
use crate::scrapers::ItemMapper;
use crate::storage::CheckpointStore;
use crate::utils::http::fetch_page_html;

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub base_url: String,
    pub schema: LabelSchema,
    pub accept_unknown_labels: bool,
    /// Pages fetched per run before the loop gives up on pagination.
    pub max_pages: u32,
}

impl From<&Config> for CrawlOptions {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            schema: config.schema(),
            accept_unknown_labels: config.accept_unknown_labels,
            max_pages: config.max_pages,
        }
    }
}

/// Walks the listing pages of one category, checkpointing each page.
pub struct CategoryCrawler<B> {
    category: Category,
    client: Client,
    list_url: String,
    navigator: DetailNavigator<B>,
    store: CheckpointStore,
    schema: LabelSchema,
    accept_unknown_labels: bool,
    max_pages: u32,
    pages: Vec<Vec<ItemRecord>>,
}

impl<B: BrowserSession> CategoryCrawler<B> {
    pub fn new(
        category: &str,
        client: Client,
        navigator: DetailNavigator<B>,
        store: CheckpointStore,
        options: CrawlOptions,
    ) -> Result<Self> {
        let category: Category = category.parse()?;
        let list_url = format!("{}/{}", options.base_url.trim_end_matches('/'), category.key());

        Ok(Self {
            category,
            client,
            list_url,
            navigator,
            store,
            schema: options.schema,
            accept_unknown_labels: options.accept_unknown_labels,
            max_pages: options.max_pages,
            pages: Vec::new(),
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }

    /// Records of every page fetched so far, one list per page.
    pub fn pages(&self) -> &[Vec<ItemRecord>] {
        &self.pages
    }

    pub fn into_navigator(self) -> DetailNavigator<B> {
        self.navigator
    }

    /// Crawl from `start_page`, or from the page after the last checkpoint.
    pub async fn crawl(&mut self, start_page: Option<u32>) -> Result<Vec<Vec<ItemRecord>>> {
        let mut page = match start_page {
            Some(page) => page,
            None => self.store.resume_page(self.category)?,
        };
        info!("Crawling {} starting at page {}", self.category, page);

        let mut fetched = 0;
        loop {
            if fetched >= self.max_pages {
                warn!(
                    "Stopping {} after {} pages without reaching the last page",
                    self.category, fetched
                );
                break;
            }
            if !self.fetch_page(page).await? {
                break;
            }
            fetched += 1;
            page += 1;
        }

        self.export_combined()?;

        info!(
            "Finished {}: {} pages, {} items",
            self.category,
            self.pages.len(),
            self.pages.iter().map(Vec::len).sum::<usize>()
        );
        Ok(self.pages.clone())
    }

    /// Rewrite the category's consolidated CSV from every saved checkpoint,
    /// under the full current schema. Nothing is written before the first
    /// checkpoint exists.
    pub fn export_combined(&self) -> Result<Option<PathBuf>> {
        if !self.store.category_dir(self.category).is_dir() {
            return Ok(None);
        }

        let records = self.store.read_category(self.category)?;
        if records.is_empty() {
            return Ok(None);
        }

        let path = self
            .store
            .write_combined(self.category, self.schema.labels(), &records)?;
        Ok(Some(path))
    }

    /// Fetch, map and checkpoint one listing page.
    ///
    /// Returns `false` when the page has no product list (or an empty one),
    /// without writing a checkpoint.
    pub async fn fetch_page(&mut self, page: u32) -> Result<bool> {
        let html = fetch_page_html(&self.client, &self.list_url, page).await?;

        let items = match parse_listing(&html) {
            Some(items) if !items.is_empty() => items,
            Some(_) => {
                info!("Empty product list on {} page {}, stopping", self.category, page);
                return Ok(false);
            }
            None => {
                info!("No product list on {} page {}, stopping", self.category, page);
                return Ok(false);
            }
        };
        info!("Found {} items on {} page {}", items.len(), self.category, page);

        let mapper = ItemMapper::new(&self.navigator, self.accept_unknown_labels);
        let mapped = mapper.map_items(&items, self.schema.clone()).await?;

        let header = CheckpointStore::header_for(&mapped.schema, &mapped.records);
        self.store
            .write_page(self.category, page, &header, &mapped.records)?;

        self.schema = mapped.schema;
        self.pages.push(mapped.records);
        Ok(true)
    }
}
