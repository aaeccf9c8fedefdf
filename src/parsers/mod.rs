pub mod listing;
pub mod spec_rows;

pub use listing::*;
pub use spec_rows::*;

use html_escape::decode_html_entities;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
