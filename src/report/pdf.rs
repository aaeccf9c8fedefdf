use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use super::pdf_path_for;
use crate::browser::ChromiumSession;
use crate::config::BrowserConfig;
use crate::error::{Result, ScrapeError};

/// A4 in inches.
const PAPER_WIDTH: f64 = 8.27;
const PAPER_HEIGHT: f64 = 11.69;

/// Prints rendered HTML reports to PDF through headless Chromium.
pub struct PdfPrinter {
    session: ChromiumSession,
}

impl PdfPrinter {
    pub async fn launch(config: &BrowserConfig) -> anyhow::Result<Self> {
        let session = ChromiumSession::launch(config).await?;
        Ok(Self { session })
    }

    /// Print `html_path` to the matching file under the `pdf` output tree.
    pub async fn print(&self, html_path: &Path) -> Result<PathBuf> {
        let pdf_path = pdf_path_for(html_path)?;

        let absolute = fs::canonicalize(html_path)?;
        let url = Url::from_file_path(&absolute)
            .map_err(|_| ScrapeError::MalformedPath(absolute.clone()))?;

        debug!(url = %url, "Generating PDF");
        let page = self.session.page();
        page.goto(url.as_str())
            .await
            .map_err(|e| ScrapeError::Pdf(format!("{}: {}", url, e)))?;

        let params = PrintToPdfParams::builder()
            .paper_width(PAPER_WIDTH)
            .paper_height(PAPER_HEIGHT)
            .print_background(true)
            .build();
        let pdf_data = page
            .pdf(params)
            .await
            .map_err(|e| ScrapeError::Pdf(format!("{}: {}", url, e)))?;

        if let Some(parent) = pdf_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&pdf_path, &pdf_data)?;

        info!("Wrote {} ({} bytes)", pdf_path.display(), pdf_data.len());
        Ok(pdf_path)
    }

    pub async fn shutdown(self) {
        self.session.shutdown().await;
    }
}
