use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::types::{DocSummary, ELinkResponse, ESearchResponse, ESummaryResponse};
use super::xml::{extract_abstract_text, extract_body_text};

const API_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const TOOL_NAME: &str = "microbe-scout";
/// E-utilities link name from a PubMed record to its PMC full-text record.
pub const PMC_LINKNAME: &str = "pubmed_pmc";
const PMC_PREFIX: &str = "PMC";

#[derive(Debug, thiserror::Error)]
pub enum EutilsError {
    #[error("E-utilities rate limit exceeded. Set NCBI_API_KEY for higher limits.")]
    RateLimited,

    #[error("E-utilities error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Search parameters for `esearch`.
pub struct SearchRequest<'a> {
    pub term: &'a str,
    pub max_results: u32,
    pub sort: Option<&'a str>,
}

/// Literature database operations used by the pipeline.
/// Implemented by `EutilsClient` for production; mock implementations used in tests.
pub trait LiteratureSource {
    /// Identifiers matching the query, at most `max_results`.
    async fn search(&self, req: &SearchRequest<'_>) -> Result<Vec<String>, EutilsError>;

    /// Summary metadata, `None` when the identifier is absent from the results.
    async fn summary(&self, pmid: &str) -> Result<Option<DocSummary>, EutilsError>;

    /// First linked full-text identifier (`PMC…`), if any.
    async fn full_text_id(&self, pmid: &str) -> Result<Option<String>, EutilsError>;

    async fn fetch_full_text(&self, pmcid: &str) -> Result<String, EutilsError>;

    async fn fetch_abstract(&self, pmid: &str) -> Result<String, EutilsError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// HTTP client for NCBI E-utilities.
///
/// Configuration via environment variables:
/// - `NCBI_API_KEY`: raises the rate limit from 3 to 10 requests/s (optional)
/// - `NCBI_EMAIL`: contact address NCBI asks tools to send (optional)
#[derive(Clone, Debug)]
pub struct EutilsClient {
    http: Client,
    api_key: Option<ApiKey>,
    email: Option<String>,
    base_url: String,
}

impl EutilsClient {
    pub fn from_env(http: Client) -> Self {
        let api_key = non_empty_env("NCBI_API_KEY").map(ApiKey);
        if api_key.is_some() {
            debug!("NCBI API key configured");
        } else {
            debug!("No NCBI_API_KEY set. Rate limit: 3 req/s.");
        }
        Self {
            http,
            api_key,
            email: non_empty_env("NCBI_EMAIL"),
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: None,
            email: None,
            base_url: base_url.to_string(),
        }
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url, EutilsError> {
        let mut url = Url::parse_with_params(&format!("{}/{name}", self.base_url), params)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("tool", TOOL_NAME);
            if let Some(ref email) = self.email {
                query.append_pair("email", email);
            }
            if let Some(ref key) = self.api_key {
                query.append_pair("api_key", &key.0);
            }
        }
        Ok(url)
    }

    async fn get_once(&self, url: &Url) -> Result<String, EutilsError> {
        let response = self
            .http
            .get(url.clone())
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("E-utilities rate limited");
            return Err(EutilsError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text).unwrap_or_else(|| {
                let snippet: String = text.chars().take(200).collect();
                format!("HTTP {status}: {snippet}")
            });
            warn!(status = %status, "E-utilities error");
            return Err(EutilsError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }

    async fn get_text(&self, url: &Url) -> Result<String, EutilsError> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if is_retriable(&e) => {
                    last_err = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        let delay_ms = jittered_backoff(attempt);
                        debug!(
                            attempt = attempt + 1,
                            delay_ms, "retrying after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(EutilsError::RateLimited))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, EutilsError> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl LiteratureSource for EutilsClient {
    async fn search(&self, req: &SearchRequest<'_>) -> Result<Vec<String>, EutilsError> {
        let retmax = req.max_results.to_string();
        let mut params = vec![
            ("db", "pubmed"),
            ("term", req.term),
            ("retmode", "json"),
            ("retmax", retmax.as_str()),
        ];
        if let Some(sort) = req.sort {
            params.push(("sort", sort));
        }
        let url = self.endpoint("esearch.fcgi", &params)?;
        let response: ESearchResponse = self.get_json(&url).await?;
        let ids = response.into_ids();
        debug!(ids = ids.len(), "esearch complete");
        Ok(ids)
    }

    async fn summary(&self, pmid: &str) -> Result<Option<DocSummary>, EutilsError> {
        let url = self.endpoint(
            "esummary.fcgi",
            &[("db", "pubmed"), ("id", pmid), ("retmode", "json")],
        )?;
        let response: ESummaryResponse = self.get_json(&url).await?;
        Ok(response.into_summary(pmid)?)
    }

    async fn full_text_id(&self, pmid: &str) -> Result<Option<String>, EutilsError> {
        let url = self.endpoint(
            "elink.fcgi",
            &[
                ("dbfrom", "pubmed"),
                ("db", "pmc"),
                ("id", pmid),
                ("linkname", PMC_LINKNAME),
                ("retmode", "json"),
            ],
        )?;
        let response: ELinkResponse = self.get_json(&url).await?;
        Ok(first_pmc_id(response.links_named(PMC_LINKNAME)))
    }

    async fn fetch_full_text(&self, pmcid: &str) -> Result<String, EutilsError> {
        let url = self.endpoint(
            "efetch.fcgi",
            &[("db", "pmc"), ("id", pmcid), ("retmode", "xml")],
        )?;
        let xml = self.get_text(&url).await?;
        extract_body_text(&xml)
    }

    async fn fetch_abstract(&self, pmid: &str) -> Result<String, EutilsError> {
        let url = self.endpoint(
            "efetch.fcgi",
            &[("db", "pubmed"), ("id", pmid), ("retmode", "xml")],
        )?;
        let xml = self.get_text(&url).await?;
        extract_abstract_text(&xml)
    }
}

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

fn is_retriable(e: &EutilsError) -> bool {
    matches!(
        e,
        EutilsError::RateLimited
            | EutilsError::Api {
                code: 500..=599,
                ..
            }
    )
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

/// E-utilities reports errors as `{"error": "..."}` (esearch/esummary) or
/// `{"ERROR": "..."}` (elink).
fn extract_error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    ["error", "ERROR"]
        .iter()
        .find_map(|k| value[*k].as_str().map(String::from))
}

/// PMC links come back as bare numbers; normalize to `PMC{n}` and keep the first.
fn first_pmc_id<'a>(links: impl IntoIterator<Item = &'a str>) -> Option<String> {
    links
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            if l.starts_with(PMC_PREFIX) {
                l.to_string()
            } else {
                format!("{PMC_PREFIX}{l}")
            }
        })
        .find(|id| {
            let digits = &id[PMC_PREFIX.len()..];
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        })
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
