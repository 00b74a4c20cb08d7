use crate::config::PipelineConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use paperhound_scraper::{Category, ListingParser, ListingRecord, PageSource};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pages dropping more than this share of their blocks get a warning.
const HIGH_DROP_RATE: f64 = 0.5;

/// Called before each page request with the category and page index.
pub type PageProgressCallback = Arc<dyn Fn(&Category, u32) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub name: String,
    pub pages_fetched: u32,
    pub blocks: usize,
    pub records: usize,
    pub skipped: usize,
    pub stopped_early: bool,
}

impl CategoryStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<ListingRecord>,
    pub stats: Vec<CategoryStats>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutput {
    pub fn pages_fetched(&self) -> u64 {
        self.stats.iter().map(|s| u64::from(s.pages_fetched)).sum()
    }

    pub fn skipped(&self) -> usize {
        self.stats.iter().map(|s| s.skipped).sum()
    }

    /// Records whose URL already appeared earlier in the run. They are kept
    /// in `records`; this only counts them.
    pub fn duplicate_urls(&self) -> usize {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| !seen.insert(r.url.as_str()))
            .count()
    }
}

/// Sequential scrape over a category table.
///
/// Every page is fetched, parsed and followed by a fixed pause before the
/// next request. The first fetch error ends the run and nothing collected so
/// far is returned.
pub struct Pipeline<S> {
    source: S,
    parser: ListingParser,
    categories: Vec<Category>,
    page_delay: Duration,
    stop_on_empty: bool,
    progress_callback: Option<PageProgressCallback>,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, parser: ListingParser, categories: Vec<Category>) -> Self {
        Self {
            source,
            parser,
            categories,
            page_delay: Duration::from_millis(crate::config::DEFAULT_PAGE_DELAY_MS),
            stop_on_empty: false,
            progress_callback: None,
        }
    }

    /// Build a pipeline from a config, scraping only `categories`.
    pub fn from_config(
        source: S,
        config: &PipelineConfig,
        categories: Vec<Category>,
    ) -> Result<Self> {
        let parser = ListingParser::new(&config.selectors, config.link_base.clone())?;
        Ok(Self::new(source, parser, categories)
            .with_page_delay(config.page_delay())
            .with_stop_on_empty(config.stop_on_empty))
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_stop_on_empty(mut self, stop_on_empty: bool) -> Self {
        self.stop_on_empty = stop_on_empty;
        self
    }

    pub fn with_progress_callback(mut self, callback: PageProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run(&self) -> Result<RunOutput> {
        let started_at = Utc::now();
        info!(
            "Starting run over {} categories ({} pages max, {:?} between pages)",
            self.categories.len(),
            PipelineConfig::total_pages(&self.categories),
            self.page_delay
        );

        let mut records = Vec::new();
        let mut stats = Vec::with_capacity(self.categories.len());

        for category in &self.categories {
            let category_stats = self.scrape_category(category, &mut records).await?;
            info!(
                "{}: {} records from {} pages ({} blocks skipped)",
                category.name,
                category_stats.records,
                category_stats.pages_fetched,
                category_stats.skipped
            );
            stats.push(category_stats);
        }

        info!("Run complete. Collected {} records", records.len());

        Ok(RunOutput {
            records,
            stats,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn scrape_category(
        &self,
        category: &Category,
        records: &mut Vec<ListingRecord>,
    ) -> Result<CategoryStats> {
        let mut stats = CategoryStats::new(&category.name);

        for page in 0..=category.max_page {
            if let Some(ref callback) = self.progress_callback {
                callback(category, page);
            }

            let body = self.source.fetch_page(category, page).await?;
            let parsed = self.parser.parse(&body, &category.name);

            debug!(
                "[{} p{}] {} blocks, {} records, {} skipped",
                category.tag,
                page,
                parsed.blocks,
                parsed.records.len(),
                parsed.skipped
            );
            if parsed.drop_rate() > HIGH_DROP_RATE {
                warn!(
                    "[{} p{}] dropped {} of {} listing blocks",
                    category.tag, page, parsed.skipped, parsed.blocks
                );
            }

            stats.pages_fetched += 1;
            stats.blocks += parsed.blocks;
            stats.records += parsed.records.len();
            stats.skipped += parsed.skipped;

            let empty = parsed.blocks == 0;
            records.extend(parsed.records);

            tokio::time::sleep(self.page_delay).await;

            if empty && self.stop_on_empty {
                info!(
                    "{}: page {} has no listings, stopping early",
                    category.name, page
                );
                stats.stopped_early = true;
                break;
            }
        }

        Ok(stats)
    }
}
