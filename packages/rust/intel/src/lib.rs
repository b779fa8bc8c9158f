//! Company intelligence gathering for the precall pipeline.
//!
//! This crate provides:
//! - [`WebsiteFetcher`] — single-page fetch + sanitize for a company domain
//! - [`NewsFetcher`] — recent headlines from a news index
//! - [`IntelligenceGatherer`] — runs both concurrently and reconciles
//!   partial failures into one [`IntelligenceSnapshot`]

pub mod news;
pub mod website;

pub use news::NewsFetcher;
pub use website::WebsiteFetcher;

use tracing::{info, instrument, warn};

use precall_shared::{FetchConfig, IntelligenceSnapshot, NewsConfig, Result, bare_domain};

// ---------------------------------------------------------------------------
// IntelligenceGatherer
// ---------------------------------------------------------------------------

/// Gathers a per-request intelligence snapshot from both sources.
pub struct IntelligenceGatherer {
    website: WebsiteFetcher,
    news: NewsFetcher,
}

impl IntelligenceGatherer {
    /// Assemble a gatherer from pre-built fetchers.
    pub fn new(website: WebsiteFetcher, news: NewsFetcher) -> Self {
        Self { website, news }
    }

    /// Build both fetchers from runtime configs.
    pub fn from_config(fetch: &FetchConfig, news: &NewsConfig) -> Result<Self> {
        Ok(Self::new(WebsiteFetcher::new(fetch)?, NewsFetcher::new(news)?))
    }

    /// Fetch website text and news headlines concurrently and reconcile
    /// the outcomes.
    ///
    /// The two fetches are independent units of work: each folds its own
    /// faults into values, so one failing cannot block or corrupt the other.
    /// The snapshot is marked invalid only when the website fetch failed
    /// and yielded no text — a news failure alone degrades the headline
    /// list but leaves the snapshot usable.
    #[instrument(skip_all, fields(domain = %domain))]
    pub async fn gather(&self, domain: &str) -> IntelligenceSnapshot {
        let company_name = company_name_from_domain(domain);

        let ((page_text, website_error), (headlines, news_error)) = tokio::join!(
            self.website.fetch(domain),
            self.news.fetch(&company_name),
        );

        if let Some(error) = &news_error {
            warn!(error = %error, "news fetch degraded, continuing with placeholder");
        }

        let fetch_error = match website_error {
            Some(error) if page_text.is_empty() => Some(error),
            _ => None,
        };

        let snapshot = IntelligenceSnapshot {
            page_text,
            headlines,
            fetch_error,
        };

        info!(
            valid = snapshot.is_valid(),
            chars = snapshot.page_text.len(),
            headlines = snapshot.headlines.len(),
            "intelligence gathered"
        );

        snapshot
    }
}

/// Derive a news search name from a domain: first label of the host,
/// dashes to spaces, title case. `acme-corp.com` → `Acme Corp`.
pub fn company_name_from_domain(domain: &str) -> String {
    let bare = bare_domain(domain);
    let host = bare.split(['/', ':']).next().unwrap_or(bare);
    let label = host.split('.').next().unwrap_or(host);

    label
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
