use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{LabelSchema, DEFAULT_LABELS};

const CONFIG_FILE: &str = "fixture_scraper";
const ENV_PREFIX: &str = "FIXTURE_SCRAPER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    Crawl,
    Report,
    ReportBatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: RunMode,
    pub category: String,
    pub start_page: Option<u32>,
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub out_dir: PathBuf,
    pub template_dir: PathBuf,
    pub max_pages: u32,
    pub accept_unknown_labels: bool,
    pub labels: Vec<String>,
    pub browser: BrowserConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub chrome_path: Option<String>,
    pub headless: bool,
    pub request_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub popup_timeout_secs: u64,
    pub metric_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_budget_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub description: String,
    pub pages_per_report: usize,
    pub images_per_page: usize,
    pub checkpoint: Option<String>,
    pub pdf: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: RunMode::Crawl,
            category: "wall".to_string(),
            start_page: None,
            base_url: "https://www.visualcomfort.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 25,
            out_dir: PathBuf::from("out"),
            template_dir: PathBuf::from("template"),
            max_pages: 500,
            accept_unknown_labels: false,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            browser: BrowserConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            request_timeout_secs: 30,
            settle_delay_ms: 2_000,
            poll_interval_ms: 500,
            popup_timeout_secs: 100,
            metric_timeout_secs: 60,
            retry_attempts: 10,
            retry_budget_ms: 5_000,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "PDF Generator".to_string(),
            description: "A simple inquiry of function.".to_string(),
            pages_per_report: 25,
            images_per_page: 4,
            checkpoint: None,
            pdf: false,
        }
    }
}

impl Config {
    /// Defaults, then `fixture_scraper.{toml,json,yaml}` if present, then
    /// `FIXTURE_SCRAPER__*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn schema(&self) -> LabelSchema {
        LabelSchema::new(self.labels.iter().cloned())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn csv_root(&self) -> PathBuf {
        self.out_dir.join("csv")
    }

    pub fn html_root(&self) -> PathBuf {
        self.out_dir.join("html")
    }

    pub fn pdf_root(&self) -> PathBuf {
        self.out_dir.join("pdf")
    }
}

impl BrowserConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn popup_timeout(&self) -> Duration {
        Duration::from_secs(self.popup_timeout_secs)
    }

    pub fn metric_timeout(&self) -> Duration {
        Duration::from_secs(self.metric_timeout_secs)
    }

    pub fn retry_budget(&self) -> Duration {
        Duration::from_millis(self.retry_budget_ms)
    }
}

impl ReportConfig {
    /// Records per rendered report file.
    pub fn group_size(&self) -> usize {
        self.pages_per_report * self.images_per_page
    }
}
