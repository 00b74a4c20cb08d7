// Tests for the run orchestrator, driven by an in-memory archive

use paperhound_core::CoreError;
use paperhound_core::config::{PipelineConfig, default_categories};
use paperhound_core::pipeline::Pipeline;
use paperhound_scraper::error::Result as ScrapeResult;
use paperhound_scraper::{
    Category, ListingParser, ListingRecord, ListingSelectors, PageSource, ScrapeError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LINK_BASE: &str = "https://exams.example.org";

/// Serves canned pages and records every request in order.
#[derive(Default)]
struct FakeArchive {
    pages: HashMap<(String, u32), String>,
    fail_at: Option<(String, u32)>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakeArchive {
    fn with_page(mut self, tag: &str, page: u32, html: String) -> Self {
        self.pages.insert((tag.to_string(), page), html);
        self
    }

    fn failing_at(mut self, tag: &str, page: u32) -> Self {
        self.fail_at = Some((tag.to_string(), page));
        self
    }

    fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageSource for FakeArchive {
    async fn fetch_page(&self, category: &Category, page: u32) -> ScrapeResult<String> {
        let key = (category.tag.clone(), page);
        self.calls.lock().unwrap().push(key.clone());

        if self.fail_at.as_ref() == Some(&key) {
            return Err(ScrapeError::Status {
                status: 500,
                url: format!("{}/?tag={}&paged={}", LINK_BASE, category.tag, page),
            });
        }

        Ok(self
            .pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }
}

fn listing(entries: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body>");
    for (title, href) in entries {
        html.push_str(&format!(
            r#"<article><h2 class="entry-title"><a href="{}">{}</a></h2></article>"#,
            href, title
        ));
    }
    html.push_str("</body></html>");
    html
}

fn parser() -> ListingParser {
    ListingParser::new(&ListingSelectors::default(), LINK_BASE).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_default_bounds_issue_108_fetches_each_followed_by_pause() {
    let delay = Duration::from_millis(1500);
    let pipeline = Pipeline::new(FakeArchive::default(), parser(), default_categories())
        .with_page_delay(delay);

    let start = tokio::time::Instant::now();
    let output = pipeline.run().await.unwrap();
    let elapsed = start.elapsed();

    let calls = pipeline.source().calls();
    assert_eq!(calls.len(), 80 + 20 + 5 + 3);
    assert_eq!(output.pages_fetched(), 108);
    assert!(elapsed >= delay * 108, "only {:?} of pauses", elapsed);
    assert!(elapsed < delay * 109, "{:?} of pauses", elapsed);

    // Inclusive bounds, strictly in table order
    let expected: Vec<(String, u32)> = [("math", 80u32), ("physics", 20), ("chemistry", 5)]
        .iter()
        .flat_map(|(tag, max)| (0..=*max).map(move |p| (tag.to_string(), p)))
        .collect();
    assert_eq!(calls, expected);
}

#[tokio::test(start_paused = true)]
async fn test_records_accumulate_across_categories_in_order() {
    let archive = FakeArchive::default()
        .with_page("math", 0, listing(&[("Final 2020", "/papers/f20.pdf"), ("", "/x.pdf")]))
        .with_page("math", 1, listing(&[("Midterm 2019", "/papers/m19.pdf")]))
        .with_page("physics", 0, listing(&[("Quiz 4", "/papers/q4.pdf")]));

    let categories = vec![
        Category::new("Mathematics", "math", 1),
        Category::new("Physics", "physics", 0),
    ];
    let pipeline = Pipeline::new(archive, parser(), categories).with_page_delay(Duration::ZERO);

    let output = pipeline.run().await.unwrap();

    assert_eq!(
        output.records,
        vec![
            ListingRecord::new("Final 2020", "https://exams.example.org/papers/f20.pdf", "Mathematics"),
            ListingRecord::new("Midterm 2019", "https://exams.example.org/papers/m19.pdf", "Mathematics"),
            ListingRecord::new("Quiz 4", "https://exams.example.org/papers/q4.pdf", "Physics"),
        ]
    );
    assert_eq!(output.stats.len(), 2);
    assert_eq!(output.stats[0].name, "Mathematics");
    assert_eq!(output.stats[0].pages_fetched, 2);
    assert_eq!(output.stats[0].skipped, 1);
    assert_eq!(output.stats[1].records, 1);
    assert_eq!(output.skipped(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_duplicates_across_pages_are_kept() {
    let page = listing(&[("Final 2020", "/papers/f20.pdf")]);
    let archive = FakeArchive::default()
        .with_page("math", 0, page.clone())
        .with_page("math", 1, page);

    let pipeline = Pipeline::new(archive, parser(), vec![Category::new("Mathematics", "math", 1)]);
    let output = pipeline.run().await.unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0], output.records[1]);
    assert_eq!(output.duplicate_urls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_aborts_run() {
    let archive = FakeArchive::default()
        .with_page("math", 0, listing(&[("Final 2020", "/papers/f20.pdf")]))
        .failing_at("physics", 3);

    let pipeline = Pipeline::new(archive, parser(), default_categories());
    let result = pipeline.run().await;

    match result {
        Err(CoreError::Scrape(ScrapeError::Status { status, .. })) => assert_eq!(status, 500),
        other => panic!("expected status error, got {:?}", other.map(|o| o.records.len())),
    }

    let calls = pipeline.source().calls();
    assert_eq!(calls.len(), 81 + 4);
    assert_eq!(calls.last(), Some(&("physics".to_string(), 3)));
}

#[tokio::test(start_paused = true)]
async fn test_stop_on_empty_ends_category_early() {
    let archive = FakeArchive::default()
        .with_page("math", 0, listing(&[("Final 2020", "/papers/f20.pdf")]))
        .with_page("math", 1, listing(&[("Final 2019", "/papers/f19.pdf")]))
        .with_page("physics", 0, listing(&[("Quiz 1", "/papers/q1.pdf")]));

    let delay = Duration::from_secs(1);
    let pipeline = Pipeline::new(archive, parser(), default_categories())
        .with_page_delay(delay)
        .with_stop_on_empty(true);

    let start = tokio::time::Instant::now();
    let output = pipeline.run().await.unwrap();

    // math: pages 0, 1 and empty 2; physics: 0 and empty 1; chemistry: empty 0
    let calls = pipeline.source().calls();
    assert_eq!(calls.len(), 3 + 2 + 1);
    let elapsed = start.elapsed();
    assert!(elapsed >= delay * 6 && elapsed < delay * 7);
    assert_eq!(output.records.len(), 3);
    assert!(output.stats.iter().all(|s| s.stopped_early));
}

#[tokio::test(start_paused = true)]
async fn test_progress_callback_sees_every_page() {
    let seen: Arc<Mutex<Vec<(String, u32)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let pipeline = Pipeline::new(
        FakeArchive::default(),
        parser(),
        vec![Category::new("Chemistry", "chemistry", 2)],
    )
    .with_progress_callback(Arc::new(move |category: &Category, page: u32| {
        seen_clone.lock().unwrap().push((category.name.clone(), page));
    }));

    pipeline.run().await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("Chemistry".to_string(), 0),
            ("Chemistry".to_string(), 1),
            ("Chemistry".to_string(), 2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_from_config_uses_selectors_link_base_and_delay() {
    let config = PipelineConfig {
        link_base: "https://mirror.example.net/files".to_string(),
        page_delay_ms: 200,
        selectors: ListingSelectors {
            block: "li.exam".to_string(),
            title: "span".to_string(),
            link: "a".to_string(),
            link_attr: "href".to_string(),
        },
        ..PipelineConfig::default()
    };
    let html = r#"<ul><li class="exam"><span>Final</span><a href="/f.pdf">pdf</a></li></ul>"#;
    let archive = FakeArchive::default().with_page("bio", 0, html.to_string());

    let pipeline = Pipeline::from_config(
        archive,
        &config,
        vec![Category::new("Biology", "bio", 0)],
    )
    .unwrap();

    let start = tokio::time::Instant::now();
    let output = pipeline.run().await.unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200) && elapsed < Duration::from_millis(400));
    assert_eq!(
        output.records,
        vec![ListingRecord::new("Final", "https://mirror.example.net/files/f.pdf", "Biology")]
    );
}
