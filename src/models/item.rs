use serde::{Deserialize, Serialize, Serializer};

pub const LABEL_NAME: &str = "Name";
pub const LABEL_CODE: &str = "Code";
pub const LABEL_DIMENSIONAL_URL: &str = "Dimensional Url";
pub const LABEL_IMAGE: &str = "Image";

pub const DEFAULT_LABELS: [&str; 11] = [
    LABEL_NAME,
    LABEL_CODE,
    "Height",
    "Width",
    "Canopy",
    "Socket",
    "Wattage",
    "Chain Length",
    "Weight",
    LABEL_DIMENSIONAL_URL,
    LABEL_IMAGE,
];

/// Ordered set of field names used as record template and CSV header.
///
/// Widening is pure: it returns a new schema and never removes labels, so a
/// caller threading the value through a run only ever sees it grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSchema {
    labels: Vec<String>,
    version: u32,
}

impl Default for LabelSchema {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

impl LabelSchema {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !unique.contains(&label) {
                unique.push(label);
            }
        }

        Self {
            labels: unique,
            version: 0,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn widen<'a, I>(&self, labels: I) -> LabelSchema
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut widened = self.clone();
        let mut grew = false;

        for label in labels {
            if !widened.contains(label) {
                widened.labels.push(label.to_string());
                grew = true;
            }
        }

        if grew {
            widened.version += 1;
        }
        widened
    }
}

/// One scraped product. Labels without a value are unset and read as "".
///
/// Labels keep the order in which they were first set, which is the order
/// the schema widens in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRecord(Vec<(String, String)>);

impl ItemRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; an existing label keeps its position.
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn value_or_empty(&self, label: &str) -> &str {
        self.get(label).unwrap_or("")
    }

    /// Labels that carry a non-empty value, in insertion order.
    pub fn populated_labels(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, _)| label.as_str())
    }

    pub fn populated(&self) -> usize {
        self.populated_labels().count()
    }

    pub fn is_populated(&self, label: &str) -> bool {
        self.get(label).map_or(false, |v| !v.is_empty())
    }

    /// Set every label not present yet to "".
    pub fn fill_missing<'a, I>(&mut self, labels: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for label in labels {
            if self.get(label).is_none() {
                self.0.push((label.to_string(), String::new()));
            }
        }
    }
}

impl Serialize for ItemRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(label, value)| (label, value)))
    }
}
