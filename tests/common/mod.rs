#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use fixture_scraper::browser::{BrowserSession, ClickTarget, DetailNavigator, NavigatorSettings};
use fixture_scraper::InteractionError;

/// Detail page served by the fake browser.
#[derive(Debug, Clone, Default)]
pub struct FakeDetail {
    pub rows: Vec<String>,
    pub gallery: Option<String>,
}

/// In-memory browser keyed by absolute URL. Pages that are not registered
/// never show the unit switch, so opening them times out.
#[derive(Default)]
pub struct FakeBrowser {
    details: HashMap<String, FakeDetail>,
    current: Mutex<String>,
    visited: Mutex<Vec<String>>,
}

impl FakeBrowser {
    pub fn with_detail(mut self, url: impl Into<String>, rows: &[&str], gallery: Option<&str>) -> Self {
        self.details.insert(
            url.into(),
            FakeDetail {
                rows: rows.iter().map(|r| r.to_string()).collect(),
                gallery: gallery.map(str::to_string),
            },
        );
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    fn current(&self) -> Option<FakeDetail> {
        self.details.get(&*self.current.lock().unwrap()).cloned()
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<(), InteractionError> {
        *self.current.lock().unwrap() = url.to_string();
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn count(&self, _selector: &str) -> Result<usize, InteractionError> {
        Ok(0)
    }

    async fn is_clickable(&self, _target: &ClickTarget) -> Result<bool, InteractionError> {
        Ok(self.current().is_some())
    }

    async fn click(&self, _target: &ClickTarget) -> Result<(), InteractionError> {
        Ok(())
    }

    async fn texts(&self, _selector: &str) -> Result<Vec<String>, InteractionError> {
        Ok(self.current().map(|d| d.rows).unwrap_or_default())
    }

    async fn attribute(&self, _selector: &str, _name: &str) -> Result<Option<String>, InteractionError> {
        Ok(self.current().and_then(|d| d.gallery))
    }
}

pub fn fast_settings() -> NavigatorSettings {
    NavigatorSettings {
        settle_delay: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
        popup_timeout: Duration::from_millis(10),
        metric_timeout: Duration::from_millis(10),
        retry_attempts: 2,
        retry_budget: Duration::from_millis(200),
    }
}

pub fn navigator(browser: FakeBrowser, base_url: &str) -> DetailNavigator<FakeBrowser> {
    DetailNavigator::new(browser, Url::parse(base_url).unwrap(), fast_settings())
}

pub struct ListingEntry<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub href: &'a str,
}

/// Listing page markup in the shape of the storefront's category grid.
pub fn listing_html(entries: &[ListingEntry<'_>]) -> String {
    let items: String = entries
        .iter()
        .map(|e| {
            format!(
                r#"<li class="item product product-item">
                  <img class="product-image-photo" src="https://cdn.example.com/{code}.jpg">
                  <strong class="product-item-name"><a href="{href}">{name}</a></strong>
                  <span class="product-sku">{code}</span>
                  <a class="view-more" href="{href}">View</a>
                </li>"#,
                name = e.name,
                code = e.code,
                href = e.href
            )
        })
        .collect();
    format!(
        r#"<html><body><ol class="products list items product-items">{}</ol></body></html>"#,
        items
    )
}

pub fn end_of_listing_html() -> String {
    r#"<html><body><p class="message info empty">We can't find products matching the selection.</p></body></html>"#
        .to_string()
}
