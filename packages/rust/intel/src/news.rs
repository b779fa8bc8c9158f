//! News index fetcher for company headlines.
//!
//! One bounded request for the top N most-recent articles. A missing
//! credential short-circuits to a single explanatory placeholder headline
//! with no error — that path is degraded-but-successful, not a failure.
//! The returned headline list is never empty.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use precall_shared::{NewsConfig, PrecallError, Result};

/// User-Agent string for news requests.
const USER_AGENT: &str = concat!("precall/", env!("CARGO_PKG_VERSION"));

/// Placeholder headline for the unconfigured path.
const NOT_CONFIGURED_HEADLINE: &str = "News backend not configured - recent headlines unavailable";

/// Fetches recent headlines for a company display name.
pub struct NewsFetcher {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    max_articles: usize,
}

/// News index response envelope — only the fields we read.
#[derive(Debug, Deserialize)]
struct NewsIndexResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsArticle {
    #[serde(default)]
    title: Option<String>,
}

impl NewsFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PrecallError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            max_articles: config.max_articles,
        })
    }

    /// Fetch recent headlines for `company_name`.
    ///
    /// Transport faults come back as a placeholder headline plus an error
    /// string; zero matching articles become a "no recent news" placeholder.
    pub async fn fetch(&self, company_name: &str) -> (Vec<String>, Option<String>) {
        let Some(api_key) = &self.api_key else {
            warn!("news backend not configured, using placeholder headline");
            return (vec![NOT_CONFIGURED_HEADLINE.to_string()], None);
        };

        info!(company = company_name, "fetching recent news");

        let page_size = self.max_articles.to_string();
        let result = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", company_name),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
                ("apiKey", api_key.as_str()),
            ])
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let msg = format!("failed to fetch news: {e}");
                warn!(company = company_name, error = %e, "news fetch failed");
                return (vec![format!("Error fetching news: {e}")], Some(msg));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let msg = format!("failed to fetch news: HTTP {status}");
            warn!(company = company_name, %status, "news index returned non-success status");
            return (vec![format!("Error fetching news: HTTP {status}")], Some(msg));
        }

        let parsed: NewsIndexResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                let msg = format!("failed to parse news response: {e}");
                warn!(company = company_name, error = %e, "news response unreadable");
                return (vec![format!("Error fetching news: {e}")], Some(msg));
            }
        };

        let mut headlines: Vec<String> = parsed
            .articles
            .into_iter()
            .filter_map(|article| article.title)
            .filter(|title| !title.trim().is_empty())
            .collect();

        if headlines.is_empty() {
            headlines.push(format!("No recent news found for {company_name}"));
        }

        info!(count = headlines.len(), "news headlines fetched");
        (headlines, None)
    }
}
