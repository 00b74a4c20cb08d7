use serde::{Deserialize, Serialize};

/// A scrape target: records are labelled with `name`, pages are requested
/// with `tag`, and page indices run from 0 to `max_page` inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub tag: String,
    pub max_page: u32,
}

impl Category {
    pub fn new(name: impl Into<String>, tag: impl Into<String>, max_page: u32) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            max_page,
        }
    }

    /// Number of pages a full run requests for this category.
    pub fn page_count(&self) -> u64 {
        u64::from(self.max_page) + 1
    }

    /// Matches either the display name or the query tag, ignoring case.
    pub fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        self.name.eq_ignore_ascii_case(key) || self.tag.eq_ignore_ascii_case(key)
    }
}
