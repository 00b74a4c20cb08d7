use crate::error::{Result, ScrapeError};
use crate::record::ListingRecord;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// CSS selectors that locate listing blocks and the fields inside them.
///
/// `title` and `link` are evaluated relative to each block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    pub block: String,
    pub title: String,
    pub link: String,
    pub link_attr: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            block: "article".to_string(),
            title: ".entry-title".to_string(),
            link: ".entry-title a".to_string(),
            link_attr: "href".to_string(),
        }
    }
}

/// Records extracted from one page, plus how many blocks were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub records: Vec<ListingRecord>,
    pub blocks: usize,
    pub skipped: usize,
}

impl ParsedPage {
    /// Fraction of located blocks that were dropped; 0.0 for an empty page.
    pub fn drop_rate(&self) -> f64 {
        if self.blocks == 0 {
            0.0
        } else {
            self.skipped as f64 / self.blocks as f64
        }
    }
}

pub struct ListingParser {
    block: Selector,
    title: Selector,
    link: Selector,
    link_attr: String,
    link_base: String,
}

impl ListingParser {
    /// Compiles the selectors once. Record URLs are `link_base` followed by
    /// the raw attribute value.
    pub fn new(selectors: &ListingSelectors, link_base: impl Into<String>) -> Result<Self> {
        Ok(Self {
            block: compile(&selectors.block)?,
            title: compile(&selectors.title)?,
            link: compile(&selectors.link)?,
            link_attr: selectors.link_attr.clone(),
            link_base: link_base.into(),
        })
    }

    pub fn link_base(&self) -> &str {
        &self.link_base
    }

    pub fn parse(&self, html: &str, category: &str) -> ParsedPage {
        let document = Html::parse_document(html);
        let mut page = ParsedPage::default();

        for block in document.select(&self.block) {
            page.blocks += 1;
            match self.extract(block) {
                Some((title, link)) => page.records.push(ListingRecord::new(
                    title,
                    format!("{}{}", self.link_base, link),
                    category,
                )),
                None => page.skipped += 1,
            }
        }

        page
    }

    fn extract<'a>(&self, block: ElementRef<'a>) -> Option<(String, &'a str)> {
        let title = block
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())?;

        let link = block
            .select(&self.link)
            .next()
            .and_then(|el| el.value().attr(&self.link_attr))
            .filter(|l| !l.is_empty())?;

        Some((title, link))
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
