use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::models::{Category, ItemRecord, LabelSchema};

const CHECKPOINT_EXTENSION: &str = "csv";
const COMBINED_STEM: &str = "result";

/// Per-category, per-page CSV checkpoints under `<root>/<category>/<page>.csv`.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    root: PathBuf,
}

impl CheckpointStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.key())
    }

    pub fn page_path(&self, category: Category, page: u32) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", page, CHECKPOINT_EXTENSION))
    }

    /// Page to continue from: one past the highest saved page, or 1.
    pub fn resume_page(&self, category: Category) -> Result<u32> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            return Ok(1);
        }

        let last = scan_pages(&dir)?.into_iter().map(|(page, _)| page).max();
        Ok(last.map_or(1, |page| page + 1))
    }

    /// Saved pages of a category in page order.
    pub fn list_pages(&self, category: Category) -> Result<Vec<(u32, PathBuf)>> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            return Err(ScrapeError::MissingDirectory(dir));
        }

        let mut pages = scan_pages(&dir)?;
        pages.sort_by_key(|(page, _)| *page);
        Ok(pages)
    }

    /// Declared header for a page: every schema label populated by at least
    /// one record, in schema order. Falls back to the whole schema when no
    /// record carries a value.
    pub fn header_for(schema: &LabelSchema, records: &[ItemRecord]) -> Vec<String> {
        let header: Vec<String> = schema
            .labels()
            .iter()
            .filter(|label| records.iter().any(|r| r.is_populated(label)))
            .cloned()
            .collect();

        if header.is_empty() {
            schema.labels().to_vec()
        } else {
            header
        }
    }

    pub fn write_page(
        &self,
        category: Category,
        page: u32,
        header: &[String],
        records: &[ItemRecord],
    ) -> Result<PathBuf> {
        let path = self.page_path(category, page);
        write_csv(&path, header, records)?;

        info!(
            "Saved checkpoint {} ({} records, {} columns)",
            path.display(),
            records.len(),
            header.len()
        );
        Ok(path)
    }

    /// Consolidated export of a category, next to its checkpoints. The file
    /// name is not numeric, so resume and page listing skip it.
    pub fn combined_path(&self, category: Category) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", COMBINED_STEM, CHECKPOINT_EXTENSION))
    }

    /// Write every record of a category under one fixed header.
    pub fn write_combined(
        &self,
        category: Category,
        header: &[String],
        records: &[ItemRecord],
    ) -> Result<PathBuf> {
        let path = self.combined_path(category);
        write_csv(&path, header, records)?;

        info!("Exported {} records to {}", records.len(), path.display());
        Ok(path)
    }

    /// Read one checkpoint back; every header cell becomes a key of every
    /// record, empty cells included.
    pub fn read_page(&self, path: &Path) -> Result<Vec<ItemRecord>> {
        if !path.is_file() {
            return Err(ScrapeError::MissingDirectory(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let header = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = ItemRecord::new();
            for (label, value) in header.iter().zip(row.iter()) {
                record.set(label, value);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// All saved records of a category, pages concatenated in page order.
    pub fn read_category(&self, category: Category) -> Result<Vec<ItemRecord>> {
        let mut records = Vec::new();
        for (_, path) in self.list_pages(category)? {
            records.extend(self.read_page(&path)?);
        }
        Ok(records)
    }
}

fn write_csv(path: &Path, header: &[String], records: &[ItemRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for record in records {
        writer.write_record(header.iter().map(|label| record.value_or_empty(label)))?;
    }
    writer.flush()?;
    Ok(())
}

fn scan_pages(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut pages = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(CHECKPOINT_EXTENSION) {
            continue;
        }

        match path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u32>().ok())
        {
            Some(page) => pages.push((page, path)),
            None => debug!("Ignoring non-checkpoint file {}", path.display()),
        }
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, CheckpointStore) {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("csv"));
        (dir, store)
    }

    fn touch(store: &CheckpointStore, category: Category, name: &str) {
        let dir = store.category_dir(category);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), "Name\n").unwrap();
    }

    fn record(pairs: &[(&str, &str)]) -> ItemRecord {
        let mut record = ItemRecord::new();
        for (label, value) in pairs {
            record.set(*label, *value);
        }
        record
    }

    #[test]
    fn resume_starts_at_one_without_checkpoints() {
        let (_dir, store) = store();
        assert_eq!(store.resume_page(Category::Wall).unwrap(), 1);

        fs::create_dir_all(store.category_dir(Category::Wall)).unwrap();
        assert_eq!(store.resume_page(Category::Wall).unwrap(), 1);
    }

    #[test]
    fn resume_continues_after_highest_page() {
        let (_dir, store) = store();
        for name in ["1.csv", "2.csv", "5.csv", "notes.txt", "draft.csv"] {
            touch(&store, Category::Ceiling, name);
        }

        assert_eq!(store.resume_page(Category::Ceiling).unwrap(), 6);
        // Other categories are unaffected.
        assert_eq!(store.resume_page(Category::Floor).unwrap(), 1);
    }

    #[test]
    fn list_pages_sorts_numerically() {
        let (_dir, store) = store();
        for name in ["10.csv", "2.csv", "1.csv"] {
            touch(&store, Category::Table, name);
        }

        let pages: Vec<u32> = store
            .list_pages(Category::Table)
            .unwrap()
            .into_iter()
            .map(|(page, _)| page)
            .collect();
        assert_eq!(pages, vec![1, 2, 10]);
    }

    #[test]
    fn list_pages_requires_the_directory() {
        let (_dir, store) = store();
        match store.list_pages(Category::Outdoor) {
            Err(ScrapeError::MissingDirectory(path)) => {
                assert!(path.ends_with("outdoor"));
            }
            other => panic!("expected MissingDirectory, got {other:?}"),
        }
    }

    #[test]
    fn header_is_union_of_populated_labels_in_schema_order() {
        let schema = LabelSchema::default();
        let records = vec![
            record(&[("Code", "A1"), ("Name", "Aerin"), ("Height", "")]),
            record(&[("Weight", "2 kg"), ("Name", "Bistro")]),
        ];

        assert_eq!(
            CheckpointStore::header_for(&schema, &records),
            vec!["Name", "Code", "Weight"]
        );
    }

    #[test]
    fn header_falls_back_to_schema_for_empty_records() {
        let schema = LabelSchema::new(["Name", "Code"]);
        let records = vec![ItemRecord::new()];
        assert_eq!(CheckpointStore::header_for(&schema, &records), vec!["Name", "Code"]);
    }

    #[test]
    fn written_pages_read_back_with_empty_defaults() {
        let (_dir, store) = store();
        let schema = LabelSchema::default();
        let records = vec![
            record(&[("Name", "Aerin, Large"), ("Code", "ARN 5010"), ("Height", "55.9 cm")]),
            record(&[("Name", "Bistro \"Mini\""), ("Weight", "1.2 kg")]),
        ];
        let header = CheckpointStore::header_for(&schema, &records);

        let path = store.write_page(Category::Wall, 3, &header, &records).unwrap();
        assert_eq!(path, store.page_path(Category::Wall, 3));

        let read = store.read_page(&path).unwrap();
        assert_eq!(read.len(), 2);
        for (original, restored) in records.iter().zip(&read) {
            for label in &header {
                assert_eq!(original.value_or_empty(label), restored.value_or_empty(label));
            }
        }
        assert_eq!(read[1].get("Code"), Some(""));
        assert_eq!(read[1].get("Height"), Some(""));
        assert_eq!(store.resume_page(Category::Wall).unwrap(), 4);
    }

    #[test]
    fn read_category_concatenates_in_page_order() {
        let (_dir, store) = store();
        let header = vec!["Name".to_string()];
        store
            .write_page(Category::Floor, 2, &header, &[record(&[("Name", "second")])])
            .unwrap();
        store
            .write_page(Category::Floor, 1, &header, &[record(&[("Name", "first")])])
            .unwrap();

        let names: Vec<String> = store
            .read_category(Category::Floor)
            .unwrap()
            .iter()
            .map(|r| r.value_or_empty("Name").to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn combined_export_uses_fixed_header_and_is_not_a_page() {
        let (_dir, store) = store();
        let header = vec!["Name".to_string()];
        store
            .write_page(Category::Wall, 1, &header, &[record(&[("Name", "first")])])
            .unwrap();

        let schema = LabelSchema::new(["Name", "Code", "Height"]);
        let records = store.read_category(Category::Wall).unwrap();
        let path = store
            .write_combined(Category::Wall, schema.labels(), &records)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Name,Code,Height\nfirst,,\n");
        assert_eq!(store.resume_page(Category::Wall).unwrap(), 2);
        assert_eq!(store.list_pages(Category::Wall).unwrap().len(), 1);
    }
}
