use anyhow::{Context, Result};
use tracing::{error, info};
use url::Url;

use fixture_scraper::browser::{ChromiumSession, DetailNavigator, NavigatorSettings};
use fixture_scraper::config::{Config, RunMode};
use fixture_scraper::models::Category;
use fixture_scraper::report::{PdfPrinter, ReportBatcher};
use fixture_scraper::scrapers::{CategoryCrawler, CrawlOptions};
use fixture_scraper::storage::{CheckpointStore, OutputLayout};
use fixture_scraper::utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fixture_scraper=info".parse()?),
        )
        .init();

    info!("Starting Fixture Scraper");

    let config = Config::load()?;
    let category: Category = config.category.parse()?;

    OutputLayout::new(&config.out_dir)
        .prepare()
        .context("Failed to prepare output directories")?;

    let result = match config.mode {
        RunMode::Crawl => crawl(&config, category).await,
        RunMode::Report => report(&config, category, false).await,
        RunMode::ReportBatch => report(&config, category, true).await,
    };

    if let Err(ref e) = result {
        error!("Run for {} failed: {:#}", category, e);
    }
    result
}

async fn crawl(config: &Config, category: Category) -> Result<()> {
    info!("Initializing Web Driver");
    let session = ChromiumSession::launch(&config.browser).await?;

    let client = utils::http::create_client(&config.user_agent, config.request_timeout())?;
    let base_url = Url::parse(&config.base_url).context("Invalid base_url")?;
    let navigator = DetailNavigator::new(session, base_url, NavigatorSettings::from(&config.browser));

    let mut crawler = CategoryCrawler::new(
        category.key(),
        client,
        navigator,
        CheckpointStore::new(config.csv_root()),
        CrawlOptions::from(config),
    )?;

    let outcome = crawler.crawl(config.start_page).await;
    let labels = crawler.schema().labels().join(", ");

    // Quit the browser whether or not the crawl succeeded
    crawler.into_navigator().into_session().shutdown().await;

    let pages = outcome?;
    info!(
        "{}: {} pages, {} items, labels [{}]",
        category,
        pages.len(),
        pages.iter().map(Vec::len).sum::<usize>(),
        labels
    );
    Ok(())
}

async fn report(config: &Config, category: Category, batch: bool) -> Result<()> {
    let batcher = ReportBatcher::new(
        CheckpointStore::new(config.csv_root()),
        &config.template_dir,
        config.html_root(),
        config.report.clone(),
    )?;

    let outputs = if batch {
        batcher.render_category_batch(category)?
    } else {
        vec![batcher.render_category(category, config.report.checkpoint.as_deref())?]
    };

    if config.report.pdf {
        let printer = PdfPrinter::launch(&config.browser).await?;
        let mut printed = Ok(());
        for html in &outputs {
            if let Err(e) = printer.print(html).await {
                printed = Err(e);
                break;
            }
        }
        printer.shutdown().await;
        printed?;
    }

    info!("Generated {} report files for {}", outputs.len(), category);
    Ok(())
}
