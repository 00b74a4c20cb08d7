pub mod category;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod record;

pub use category::Category;
pub use error::ScrapeError;
pub use fetcher::{HttpFetcher, PageSource, page_url};
pub use parser::{ListingParser, ListingSelectors, ParsedPage};
pub use record::ListingRecord;
