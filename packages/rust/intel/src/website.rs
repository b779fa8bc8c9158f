//! Company website fetcher and text sanitizer.
//!
//! One bounded GET per call; the parsed document is stripped of
//! script/style/nav/header/footer chrome, whitespace-collapsed, and
//! truncated to the configured character budget. Transport faults are
//! folded into the returned error string, never raised to the caller.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use precall_shared::{FetchConfig, PrecallError, Result};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("precall/", env!("CARGO_PKG_VERSION"));

/// Fetches a single page of sanitized text for a company domain.
pub struct WebsiteFetcher {
    client: Client,
    char_budget: usize,
}

impl WebsiteFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PrecallError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            char_budget: config.char_budget,
        })
    }

    /// Fetch and sanitize one page of text for `domain`.
    ///
    /// Any failure — bad URL, DNS, TLS, timeout, non-2xx — comes back as
    /// `("", Some(message))`.
    pub async fn fetch(&self, domain: &str) -> (String, Option<String>) {
        let raw_url = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        };

        let url = match Url::parse(&raw_url) {
            Ok(url) => url,
            Err(e) => {
                let msg = format!("failed to access website {domain}: invalid URL: {e}");
                warn!(%domain, error = %e, "website URL rejected");
                return (String::new(), Some(msg));
            }
        };

        info!(%url, "fetching company website");

        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                let msg = format!("failed to access website {domain}: {e}");
                warn!(%domain, error = %e, "website fetch failed");
                return (String::new(), Some(msg));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let msg = format!("failed to access website {domain}: HTTP {status}");
            warn!(%domain, %status, "website returned non-success status");
            return (String::new(), Some(msg));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let msg = format!("failed to access website {domain}: body read failed: {e}");
                warn!(%domain, error = %e, "website body read failed");
                return (String::new(), Some(msg));
            }
        };

        let text = sanitize_html(&body, self.char_budget);
        debug!(chars = text.len(), %domain, "website text extracted");
        (text, None)
    }
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// Strip chrome elements, collapse whitespace, and truncate to `char_budget`.
fn sanitize_html(body: &str, char_budget: usize) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let doc = Html::parse_document(body);
    let chrome_sel = Selector::parse("script, style, nav, header, footer").unwrap();

    // Work on the normalized serialization so element HTML matches exactly.
    let mut html = doc.root_element().html();
    for el in doc.select(&chrome_sel) {
        html = html.replace(&el.html(), "");
    }

    let stripped = Html::parse_document(&html);
    let text = stripped
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");

    let collapsed = WS_RE.replace_all(&text, " ");
    truncate_chars(collapsed.trim(), char_budget)
}

/// Truncate to at most `budget` characters on a char boundary.
fn truncate_chars(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}
