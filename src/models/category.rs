use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScrapeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ceiling,
    Wall,
    Floor,
    Table,
    Outdoor,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Ceiling,
        Category::Wall,
        Category::Floor,
        Category::Table,
        Category::Outdoor,
    ];

    /// URL path segment, output subdirectory and template directory.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Ceiling => "ceiling",
            Category::Wall => "wall",
            Category::Floor => "floor",
            Category::Table => "table",
            Category::Outdoor => "outdoor",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "ceiling" => Some(Category::Ceiling),
            "wall" => Some(Category::Wall),
            "floor" => Some(Category::Floor),
            "table" => Some(Category::Table),
            "outdoor" => Some(Category::Outdoor),
            _ => None,
        }
    }
}

impl FromStr for Category {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_key(s).ok_or_else(|| ScrapeError::InvalidCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys_case_insensitively() {
        assert_eq!("ceiling".parse::<Category>().unwrap(), Category::Ceiling);
        assert_eq!(" Wall ".parse::<Category>().unwrap(), Category::Wall);
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), Some(category));
        }
    }

    #[test]
    fn rejects_categories_outside_the_fixed_set() {
        for key in ["", "fans", "ceilings", "lamp"] {
            match key.parse::<Category>() {
                Err(ScrapeError::InvalidCategory(raw)) => assert_eq!(raw, key),
                other => panic!("expected InvalidCategory for {key:?}, got {other:?}"),
            }
        }
    }
}
