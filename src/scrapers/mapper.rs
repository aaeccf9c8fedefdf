use tracing::{error, info, warn};

use crate::browser::{BrowserSession, DetailNavigator};
use crate::error::{InteractionError, Result};
use crate::models::{
    ItemRecord, LabelSchema, LABEL_CODE, LABEL_DIMENSIONAL_URL, LABEL_IMAGE, LABEL_NAME,
};
use crate::parsers::{parse_spec_row, ListingItem};

/// Records of one listing page together with the schema widened by them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPage {
    pub records: Vec<ItemRecord>,
    pub schema: LabelSchema,
}

pub struct ItemMapper<'a, B> {
    navigator: &'a DetailNavigator<B>,
    accept_unknown_labels: bool,
}

impl<'a, B: BrowserSession> ItemMapper<'a, B> {
    pub fn new(navigator: &'a DetailNavigator<B>, accept_unknown_labels: bool) -> Self {
        Self {
            navigator,
            accept_unknown_labels,
        }
    }

    /// Map listing items to records in input order.
    ///
    /// A recoverable browser failure on one item keeps whatever was already
    /// extracted for it; only a lost session aborts the page.
    pub async fn map_items(&self, items: &[ListingItem], schema: LabelSchema) -> Result<MappedPage> {
        let mut schema = schema;
        let mut records = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let mut record = listing_record(item);

            info!("{} || {}", index, item.detail_path.as_deref().unwrap_or("-"));

            if let Some(path) = &item.detail_path {
                match self.fill_details(path, &schema, &mut record).await {
                    Ok(()) => {}
                    Err(e) if e.is_recoverable() => {
                        warn!("Skipping details of item {} ({}): {}", index, path, e);
                    }
                    Err(e) => {
                        error!("Aborting page at item {} ({}): {}", index, path, e);
                        return Err(e.into());
                    }
                }
            }

            let widened = schema.widen(record.populated_labels());
            if widened.version() != schema.version() {
                info!("Label schema widened to {} labels", widened.len());
            }
            schema = widened;
            records.push(record);
        }

        Ok(MappedPage { records, schema })
    }

    async fn fill_details(
        &self,
        path: &str,
        schema: &LabelSchema,
        record: &mut ItemRecord,
    ) -> std::result::Result<(), InteractionError> {
        self.navigator.open_detail(path).await?;

        for row in self.navigator.spec_rows().await? {
            let Some((key, value)) = parse_spec_row(&row) else {
                continue;
            };
            if schema.contains(&key) || self.accept_unknown_labels {
                record.set(key, value);
            }
        }

        if let Some(image) = self.navigator.gallery_image().await? {
            record.set(LABEL_IMAGE, image);
        }

        Ok(())
    }
}

fn listing_record(item: &ListingItem) -> ItemRecord {
    let mut record = ItemRecord::new();

    if let Some(name) = &item.name {
        record.set(LABEL_NAME, name.trim());
    }
    if let Some(code) = &item.code {
        record.set(LABEL_CODE, code.trim());
    }
    if let Some(image) = &item.image_url {
        record.set(LABEL_IMAGE, image.as_str());
    }
    if let Some(path) = &item.detail_path {
        record.set(LABEL_DIMENSIONAL_URL, path.as_str());
    }

    record
}
