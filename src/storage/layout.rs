use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::models::Category;

pub const OUTPUT_KINDS: [&str; 3] = ["pdf", "html", "csv"];

/// `<root>/{pdf,html,csv}/<category>` for every known category.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: &str, category: Category) -> PathBuf {
        self.root.join(kind).join(category.key())
    }

    /// Create every output directory, whichever category is being run.
    pub fn prepare(&self) -> Result<()> {
        for kind in OUTPUT_KINDS {
            for category in Category::ALL {
                let dir = self.dir(kind, category);
                fs::create_dir_all(&dir)?;
                debug!("Prepared {}", dir.display());
            }
        }
        Ok(())
    }
}
