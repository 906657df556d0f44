// API client module: a small blocking HTTP client for the Canvas planner
// endpoint. Every request carries the access token as a bearer header.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LINK};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, TOKEN_VAR};

const PLANNER_PATH: &str = "/api/v1/planner/items";
const PAGE_SIZE: u32 = 100;
/// Upper bound on followed `rel="next"` links for a single fetch.
const MAX_PAGES: usize = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking Canvas client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// One entry of `GET /api/v1/planner/items`. Only the fields the viewer
/// needs are kept, and all of them tolerate being absent.
#[derive(Deserialize, Debug, Clone)]
pub struct PlannerItem {
    #[serde(default)]
    pub context_name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub plannable_type: Option<String>,
    #[serde(default)]
    pub plannable_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plannable: Plannable,
    #[serde(default)]
    pub submissions: Option<Submissions>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Plannable {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

/// Canvas sends `"submissions": false` for items that take no submission
/// and an object otherwise.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Submissions {
    Tracked(SubmissionStatus),
    Untracked(bool),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SubmissionStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub submitted: bool,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PlannerItem {
    /// When the item is due: the assignment deadline if it has one, else the
    /// date the planner files it under.
    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.plannable.due_at.or(self.plannable_date)
    }

    pub fn is_submitted(&self) -> bool {
        matches!(
            self.submissions,
            Some(Submissions::Tracked(SubmissionStatus { submitted: true }))
        )
    }
}

impl ApiClient {
    /// Build a client for the instance and token in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .default_headers(auth_headers(&config.access_token)?)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("canvas-tui/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch every planner item from `start_date` onwards, following
    /// Canvas pagination.
    pub fn fetch_planner_items(&self, start_date: NaiveDate) -> Result<Vec<PlannerItem>> {
        let mut url = self
            .base_url
            .join(PLANNER_PATH)
            .context("Failed to build planner URL")?;
        url.query_pairs_mut()
            .append_pair("start_date", &start_date.format("%Y-%m-%d").to_string())
            .append_pair("per_page", &PAGE_SIZE.to_string());

        let mut items = Vec::new();
        let mut pages = 0;
        let mut next = Some(url);
        while let Some(url) = next.take() {
            if pages == MAX_PAGES {
                warn!(pages, "planner pagination limit reached; remaining pages skipped");
                break;
            }
            pages += 1;
            debug!(page = pages, url = %url, "requesting planner items");

            let res = self
                .client
                .get(url)
                .send()
                .context("Failed to reach Canvas")?;
            let res = check_status(res)?;

            next = next_page(res.headers()).filter(|link| {
                let same = link.origin() == self.base_url.origin();
                if !same {
                    warn!(link = %link, "ignoring pagination link to another origin");
                }
                same
            });

            let page: Vec<PlannerItem> = res.json().context("Parsing planner items json")?;
            items.extend(page);
        }

        info!(count = items.len(), pages, "fetched planner items");
        Ok(items)
    }

    /// Turn an item's `html_url` (usually a path like
    /// `/courses/1/assignments/2`) into an absolute URL.
    pub fn resolve_url(&self, html_url: &str) -> Option<String> {
        resolve_url(&self.base_url, html_url)
    }
}

pub fn resolve_url(base: &Url, html_url: &str) -> Option<String> {
    let html_url = html_url.trim();
    if html_url.is_empty() {
        return None;
    }
    base.join(html_url).ok().map(String::from)
}

/// Authorization header map for a bearer token. The value is marked
/// sensitive so it is left out of reqwest's debug output.
fn auth_headers(token: &str) -> Result<HeaderMap> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .with_context(|| format!("{TOKEN_VAR} contains characters not allowed in a header"))?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

fn check_status(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => {
            bail!("Canvas rejected the access token ({status}); check {TOKEN_VAR}")
        }
        StatusCode::FORBIDDEN => bail!("Canvas denied access to the planner ({status})"),
        _ => bail!("Canvas request failed: {} - {}", status, truncate(&body, 200)),
    }
}

/// Target of the `rel="next"` entry of an RFC 8288 `Link` header.
fn next_page(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let mut parts = link.split(';');
            let target = parts.next()?.trim();
            let is_next = parts.any(|param| {
                matches!(
                    param.trim().replace(' ', "").as_str(),
                    "rel=\"next\"" | "rel=next"
                )
            });
            if !is_next {
                return None;
            }
            let target = target.strip_prefix('<')?.strip_suffix('>')?;
            Url::parse(target).ok()
        })
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
