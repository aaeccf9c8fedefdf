use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ScrapeError;

pub fn create_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(client)
}

/// Single GET of a listing page; non-success statuses are errors.
pub async fn fetch_page_html(
    client: &Client,
    url: &str,
    page: u32,
) -> std::result::Result<String, ScrapeError> {
    info!("Parsing items from {} (p={})", url, page);

    let response = client.get(url).query(&[("p", page)]).send().await?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP error {}: {}", status, url);
        return Err(ScrapeError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.text().await?)
}
