use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures raised while driving the browser session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("click intercepted: {0}")]
    ClickIntercepted(String),

    #[error("element missing: {0}")]
    ElementMissing(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("browser session lost: {0}")]
    Session(String),
}

impl InteractionError {
    /// Transient UI states that a fresh attempt at the navigation can clear.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InteractionError::NotInteractable(_) | InteractionError::ClickIntercepted(_)
        )
    }

    /// Whether the item being mapped can be skipped and the page continued.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, InteractionError::Session(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, InteractionError::Timeout { .. })
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error(transparent)]
    Browser(#[from] InteractionError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template not found: {0}")]
    MissingTemplate(String),

    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed path: {}", .0.display())]
    MalformedPath(PathBuf),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
