use chrono::Local;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{Category, ItemRecord, DEFAULT_LABELS};
use crate::storage::CheckpointStore;

mod pdf;

pub use pdf::PdfPrinter;

const TEMPLATE_FILE: &str = "index.html";

#[derive(Serialize)]
struct ReportContext<'a> {
    title: &'a str,
    description: &'a str,
    data: Vec<&'a [ItemRecord]>,
}

/// Renders saved checkpoints through `<category>/index.html`.
pub struct ReportBatcher {
    checkpoints: CheckpointStore,
    templates: Tera,
    html_root: PathBuf,
    settings: ReportConfig,
}

impl ReportBatcher {
    pub fn new(
        checkpoints: CheckpointStore,
        template_root: &Path,
        html_root: impl Into<PathBuf>,
        settings: ReportConfig,
    ) -> Result<Self> {
        let templates = if template_root.is_dir() {
            let glob = format!("{}/**/*.html", template_root.display());
            Tera::new(&glob)?
        } else {
            warn!("Template directory {} not found", template_root.display());
            Tera::default()
        };

        Ok(Self {
            checkpoints,
            templates,
            html_root: html_root.into(),
            settings,
        })
    }

    /// Render one checkpoint (e.g. `"1.csv"`), or every saved page when none
    /// is named, into a single HTML file.
    pub fn render_category(&self, category: Category, checkpoint: Option<&str>) -> Result<PathBuf> {
        let template = self.template_name(category)?;

        let (records, stem) = match checkpoint {
            Some(file) => {
                let path = self.checkpoints.category_dir(category).join(file);
                let stem = Path::new(file)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or("default")
                    .to_string();
                (self.checkpoints.read_page(&path)?, stem)
            }
            None => (self.checkpoints.read_category(category)?, "all".to_string()),
        };

        let output = self.output_path(category, &stem);
        self.render_to(&template, &records, &output)?;
        Ok(output)
    }

    /// Render every saved record of a category into report files of
    /// `pages_per_report * images_per_page` records each.
    pub fn render_category_batch(&self, category: Category) -> Result<Vec<PathBuf>> {
        let template = self.template_name(category)?;
        let records = self.checkpoints.read_category(category)?;

        let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let mut outputs = Vec::new();

        for (index, group) in chunk(&records, self.settings.group_size()).into_iter().enumerate() {
            let name = format!("{}-{}-{:03}", category.key(), stamp, index + 1);
            let output = self.output_path(category, &name);
            self.render_to(&template, group, &output)?;
            outputs.push(output);
        }

        info!("Rendered {} report files for {}", outputs.len(), category);
        Ok(outputs)
    }

    fn template_name(&self, category: Category) -> Result<String> {
        let name = format!("{}/{}", category.key(), TEMPLATE_FILE);
        if self.templates.get_template_names().any(|n| n == name) {
            Ok(name)
        } else {
            Err(ScrapeError::MissingTemplate(name))
        }
    }

    fn output_path(&self, category: Category, stem: &str) -> PathBuf {
        self.html_root
            .join(category.key())
            .join(format!("{}.html", stem))
    }

    fn render_to(&self, template: &str, records: &[ItemRecord], output: &Path) -> Result<()> {
        // Templates address columns by label, so every default label must exist
        let padded: Vec<ItemRecord> = records
            .iter()
            .cloned()
            .map(|mut record| {
                record.fill_missing(DEFAULT_LABELS.iter().copied());
                record
            })
            .collect();

        let report = ReportContext {
            title: &self.settings.title,
            description: &self.settings.description,
            data: chunk(&padded, self.settings.images_per_page),
        };
        let context = Context::from_serialize(&report)?;
        let html = self.templates.render(template, &context)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, html)?;

        info!("Wrote {} ({} records)", output.display(), records.len());
        Ok(())
    }
}

/// Consecutive slices of at most `size` elements, in order. A zero size is
/// treated as one.
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

/// `out/html/<category>/<name>.html` → `out/pdf/<category>/<name>.pdf`.
pub fn pdf_path_for(html_path: &Path) -> Result<PathBuf> {
    let mut parts: Vec<OsString> = html_path
        .components()
        .map(|c| c.as_os_str().to_os_string())
        .collect();
    if parts.len() < 3 {
        return Err(ScrapeError::MalformedPath(html_path.to_path_buf()));
    }

    let kind = parts.len() - 3;
    parts[kind] = OsString::from("pdf");

    let mut pdf_path: PathBuf = parts.iter().collect();
    pdf_path.set_extension("pdf");
    Ok(pdf_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const TEMPLATE: &str = "{{ title }}|{% for page in data %}[{% for item in page %}{{ item.Name }};{% endfor %}]{% endfor %}";

    struct Fixture {
        _dir: TempDir,
        root: PathBuf,
        store: CheckpointStore,
    }

    fn fixture(records: usize) -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();

        let template_dir = root.join("template/ceiling");
        fs::create_dir_all(&template_dir).unwrap();
        fs::write(template_dir.join("index.html"), TEMPLATE).unwrap();

        let store = CheckpointStore::new(root.join("out/csv"));
        let header = vec!["Name".to_string(), "Code".to_string()];
        let all: Vec<ItemRecord> = (1..=records)
            .map(|i| {
                let mut r = ItemRecord::new();
                r.set("Name", format!("n{}", i));
                r.set("Code", format!("c{}", i));
                r
            })
            .collect();
        let (first, second) = all.split_at(records.min(6));
        store.write_page(Category::Ceiling, 1, &header, first).unwrap();
        if !second.is_empty() {
            store.write_page(Category::Ceiling, 2, &header, second).unwrap();
        }

        Fixture {
            _dir: dir,
            root,
            store,
        }
    }

    fn batcher(f: &Fixture, settings: ReportConfig) -> ReportBatcher {
        ReportBatcher::new(
            f.store.clone(),
            &f.root.join("template"),
            f.root.join("out/html"),
            settings,
        )
        .unwrap()
    }

    #[test]
    fn chunk_preserves_order_and_covers_everything() {
        let items: Vec<u32> = (0..10).collect();
        let chunks = chunk(&items, 4);

        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(chunks.concat(), items);
        assert!(chunk::<u32>(&[], 4).is_empty());
    }

    #[test]
    fn pdf_path_swaps_output_kind_and_extension() {
        assert_eq!(
            pdf_path_for(Path::new("out/html/ceiling/ceiling-1.html")).unwrap(),
            PathBuf::from("out/pdf/ceiling/ceiling-1.pdf")
        );
        assert_eq!(
            pdf_path_for(Path::new("/srv/out/html/wall/1.html")).unwrap(),
            PathBuf::from("/srv/out/pdf/wall/1.pdf")
        );
        assert!(matches!(
            pdf_path_for(Path::new("1.html")),
            Err(ScrapeError::MalformedPath(_))
        ));
    }

    #[test]
    fn renders_named_checkpoint_in_chunks_of_four() {
        let f = fixture(6);
        let batcher = batcher(&f, ReportConfig::default());

        let output = batcher.render_category(Category::Ceiling, Some("1.csv")).unwrap();

        assert_eq!(output, f.root.join("out/html/ceiling/1.html"));
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "PDF Generator|[n1;n2;n3;n4;][n5;n6;]"
        );
    }

    #[test]
    fn renders_all_pages_when_no_checkpoint_is_named() {
        let f = fixture(9);
        let batcher = batcher(&f, ReportConfig::default());

        let output = batcher.render_category(Category::Ceiling, None).unwrap();

        assert!(output.ends_with("all.html"));
        let html = fs::read_to_string(&output).unwrap();
        assert!(html.ends_with("[n9;]"), "{html}");
    }

    #[test]
    fn batch_splits_into_report_groups() {
        let f = fixture(10);
        let settings = ReportConfig {
            pages_per_report: 1,
            ..ReportConfig::default()
        };
        let batcher = batcher(&f, settings);

        let outputs = batcher.render_category_batch(Category::Ceiling).unwrap();

        assert_eq!(outputs.len(), 3);
        let contents: Vec<String> = outputs
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents[0], "PDF Generator|[n1;n2;n3;n4;]");
        assert_eq!(contents[2], "PDF Generator|[n9;n10;]");
        for output in &outputs {
            let name = output.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("ceiling-"), "{name}");
        }
    }

    #[test]
    fn missing_template_is_reported_per_category() {
        let f = fixture(2);
        let batcher = batcher(&f, ReportConfig::default());

        match batcher.render_category_batch(Category::Wall) {
            Err(ScrapeError::MissingTemplate(name)) => assert_eq!(name, "wall/index.html"),
            other => panic!("expected MissingTemplate, got {other:?}"),
        }
    }

    #[test]
    fn missing_checkpoint_directory_is_fatal() {
        let f = fixture(2);
        fs::remove_dir_all(f.root.join("out/csv/ceiling")).unwrap();
        let batcher = batcher(&f, ReportConfig::default());

        assert!(matches!(
            batcher.render_category_batch(Category::Ceiling),
            Err(ScrapeError::MissingDirectory(_))
        ));
    }
}
