use anyhow::Result;
use fixture_scraper::config::Config;
use fixture_scraper::models::Category;
use fixture_scraper::parsers::parse_listing;
use fixture_scraper::utils::http::{create_client, fetch_page_html};
use std::fs;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let client = create_client(&config.user_agent, config.request_timeout())?;

    // First listing page of every category
    for category in Category::ALL {
        let url = format!("{}/{}", config.base_url.trim_end_matches('/'), category.key());
        println!("Fetching {}...", url);

        let html = fetch_page_html(&client, &url, 1).await?;
        fs::write(format!("{}_sample.html", category.key()), &html)?;

        match parse_listing(&html) {
            Some(items) => {
                let with_links = items.iter().filter(|i| i.detail_path.is_some()).count();
                println!(
                    "Found {} items ({} with detail links) on {}",
                    items.len(),
                    with_links,
                    category
                );
            }
            None => println!("No product list on {}", category),
        }
    }

    Ok(())
}
