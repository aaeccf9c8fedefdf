use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::clean_text;

static PRODUCTS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ol.products").expect("Invalid products selector"));
static ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.item").expect("Invalid item selector"));
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("strong.product-item-name").expect("Invalid name selector"));
static NAME_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Invalid name link selector"));
static CODE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.product-sku").expect("Invalid code selector"));
static IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img.product-image-photo, img").expect("Invalid image selector")
});
static DETAIL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.view-more").expect("Invalid detail link selector"));

/// Plain data pulled out of one `li.item` of a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingItem {
    pub name: Option<String>,
    pub code: Option<String>,
    pub image_url: Option<String>,
    pub detail_path: Option<String>,
}

/// Extract the product list of a listing page.
///
/// Returns `None` when the `ol.products` container is absent, which marks
/// the end of pagination. A present but empty container yields `Some(vec![])`.
pub fn parse_listing(html: &str) -> Option<Vec<ListingItem>> {
    let document = Html::parse_document(html);
    let products = document.select(&PRODUCTS_SELECTOR).next()?;

    Some(products.select(&ITEM_SELECTOR).map(extract_item).collect())
}

fn extract_item(element: ElementRef<'_>) -> ListingItem {
    let mut item = ListingItem::default();

    // Name, preferring the anchor inside the heading
    if let Some(name_elem) = element.select(&NAME_SELECTOR).next() {
        let name_source = name_elem.select(&NAME_LINK_SELECTOR).next().unwrap_or(name_elem);
        item.name = non_empty(clean_text(&name_source.text().collect::<String>()));
    }

    if let Some(code_elem) = element.select(&CODE_SELECTOR).next() {
        item.code = non_empty(clean_text(&code_elem.text().collect::<String>()));
    }

    // Thumbnails are lazy-loaded on some listings
    if let Some(img) = element.select(&IMAGE_SELECTOR).next() {
        item.image_url = img
            .value()
            .attr("src")
            .or_else(|| img.value().attr("data-src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty());
    }

    if let Some(link) = element.select(&DETAIL_SELECTOR).next() {
        item.detail_path = link
            .value()
            .attr("href")
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty());
    }

    item
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
