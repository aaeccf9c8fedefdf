use async_trait::async_trait;
use std::fmt;

use crate::error::InteractionError;

mod chromium;
pub mod navigator;

pub use chromium::ChromiumSession;
pub use navigator::{DetailNavigator, NavigatorSettings};

/// Something the navigator waits on and clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// First element matching a CSS selector.
    Css(String),
    /// First `button` whose visible text is empty (icon-only close buttons).
    BlankButton,
}

impl fmt::Display for ClickTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickTarget::Css(selector) => write!(f, "{}", selector),
            ClickTarget::BlankButton => write!(f, "button with empty text"),
        }
    }
}

/// DOM capabilities of a stateful browser tab.
///
/// Implementations report element-level failures through the
/// `InteractionError` variants so callers can tell transient UI states from
/// a dead session.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), InteractionError>;

    /// Number of elements matching `selector` on the current page.
    async fn count(&self, selector: &str) -> Result<usize, InteractionError>;

    /// Whether the target exists, is visible and enabled. Missing targets
    /// are `Ok(false)`.
    async fn is_clickable(&self, target: &ClickTarget) -> Result<bool, InteractionError>;

    async fn click(&self, target: &ClickTarget) -> Result<(), InteractionError>;

    /// Visible text of every element matching `selector`.
    async fn texts(&self, selector: &str) -> Result<Vec<String>, InteractionError>;

    /// Attribute of the first element matching `selector`.
    async fn attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, InteractionError>;
}
