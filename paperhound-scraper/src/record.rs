use serde::{Deserialize, Serialize};

/// One exam/document entry found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub url: String,
    pub category: String,
}

impl ListingRecord {
    /// Column order shared by every exporter's header row.
    pub const FIELDS: [&'static str; 3] = ["title", "url", "category"];

    pub fn new(title: impl Into<String>, url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            category: category.into(),
        }
    }

    /// Field values in `FIELDS` order.
    pub fn values(&self) -> [&str; 3] {
        [&self.title, &self.url, &self.category]
    }
}
