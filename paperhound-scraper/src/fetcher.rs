use crate::category::Category;
use crate::error::{Result, ScrapeError};
use reqwest::Client;
use reqwest::header::COOKIE;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("paperhound/", env!("CARGO_PKG_VERSION"));

/// Anything that can return the raw markup of one listing page.
pub trait PageSource {
    fn fetch_page(&self, category: &Category, page: u32)
    -> impl Future<Output = Result<String>> + Send;
}

/// Build the listing URL for `tag` at a zero-based page index.
///
/// Page 0 is the bare tag listing; later pages carry `paged=<index>`.
pub fn page_url(base: &Url, tag: &str, page: u32) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("tag", tag);
        if page > 0 {
            query.append_pair("paged", &page.to_string());
        }
    }
    url
}

pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    cookie: Option<String>,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> HttpFetcherBuilder {
        HttpFetcherBuilder {
            base_url: base_url.to_string(),
            cookie: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }
}

impl PageSource for HttpFetcher {
    async fn fetch_page(&self, category: &Category, page: u32) -> Result<String> {
        let url = page_url(&self.base_url, &category.tag, page);
        debug!("Fetching {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(ref cookie) = self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            "{} answered {} in {:?}",
            url,
            status.as_u16(),
            start.elapsed()
        );

        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

pub struct HttpFetcherBuilder {
    base_url: String,
    cookie: Option<String>,
    timeout_secs: u64,
    user_agent: String,
}

impl HttpFetcherBuilder {
    /// Session cookie sent verbatim with every request. Empty strings are ignored.
    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<HttpFetcher> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let client = Client::builder()
            .user_agent(self.user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs((self.timeout_secs / 2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(HttpFetcher {
            client,
            base_url,
            cookie: self.cookie,
        })
    }
}
