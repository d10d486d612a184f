//! Per-identifier retrieval: summary, full-text resolution, abstract fallback.

use tracing::{debug, warn};

use crate::eutils::LiteratureSource;

const PUBMED_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";
const PMC_ARTICLE_BASE: &str = "https://pmc.ncbi.nlm.nih.gov/articles";
const TITLE_UNAVAILABLE: &str = "unavailable";

/// Where a record's body text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    FullText,
    AbstractOnly,
    Empty,
}

impl TextSource {
    pub fn label(self) -> &'static str {
        match self {
            TextSource::FullText => "full text (PMC)",
            TextSource::AbstractOnly => "abstract only",
            TextSource::Empty => "no text available",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaperRecord {
    pub pmid: String,
    pub title: Option<String>,
    pub link: String,
    pub body: String,
    /// Kept separately from `body`: regulation cues are read from title + abstract.
    pub abstract_text: String,
    pub source: TextSource,
    pub pmcid: Option<String>,
}

impl PaperRecord {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(TITLE_UNAVAILABLE)
    }

    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title.as_deref().unwrap_or_default(), self.abstract_text)
    }
}

pub fn pubmed_link(pmid: &str) -> String {
    format!("{PUBMED_BASE}/{pmid}/")
}

pub fn pmc_link(pmcid: &str) -> String {
    format!("{PMC_ARTICLE_BASE}/{pmcid}/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedId {
    pub pmid: String,
    pub reason: String,
}

impl SkippedId {
    pub fn link(&self) -> String {
        pubmed_link(&self.pmid)
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(PaperRecord),
    Skipped(SkippedId),
}

/// Retrieve one record. Never fails the batch: a summary failure or a
/// missing summary entry becomes `Skipped`, text failures degrade to the
/// next source.
pub async fn fetch_record(source: &impl LiteratureSource, pmid: &str) -> FetchOutcome {
    let skip = |reason: String| {
        warn!(pmid, %reason, "skipping record");
        FetchOutcome::Skipped(SkippedId {
            pmid: pmid.to_string(),
            reason,
        })
    };

    let summary = match source.summary(pmid).await {
        Ok(Some(s)) => s,
        Ok(None) => return skip("not present in summary results".to_string()),
        Err(e) => return skip(format!("summary request failed: {e}")),
    };
    if let Some(err) = summary.error {
        return skip(format!("summary unavailable: {err}"));
    }

    let (pmcid, full_text) = resolve_full_text(source, pmid).await;

    let abstract_text = match source.fetch_abstract(pmid).await {
        Ok(text) => text,
        Err(e) => {
            warn!(pmid, error = %e, "abstract fetch failed");
            String::new()
        }
    };

    let (body, text_source) = match full_text {
        Some(text) => (text, TextSource::FullText),
        None if !abstract_text.is_empty() => (abstract_text.clone(), TextSource::AbstractOnly),
        None => (String::new(), TextSource::Empty),
    };

    debug!(pmid, source = text_source.label(), chars = body.len(), "record fetched");

    FetchOutcome::Fetched(PaperRecord {
        pmid: pmid.to_string(),
        title: summary.title,
        link: pubmed_link(pmid),
        body,
        abstract_text,
        source: text_source,
        pmcid,
    })
}

/// PMC id and non-empty body text, when both resolve.
async fn resolve_full_text(
    source: &impl LiteratureSource,
    pmid: &str,
) -> (Option<String>, Option<String>) {
    let pmcid = match source.full_text_id(pmid).await {
        Ok(Some(id)) => id,
        Ok(None) => return (None, None),
        Err(e) => {
            warn!(pmid, error = %e, "full-text link lookup failed");
            return (None, None);
        }
    };

    match source.fetch_full_text(&pmcid).await {
        Ok(text) if !text.trim().is_empty() => (Some(pmcid), Some(text)),
        Ok(_) => {
            debug!(pmid, %pmcid, "full-text document has no body");
            (Some(pmcid), None)
        }
        Err(e) => {
            warn!(pmid, %pmcid, error = %e, "full-text fetch failed");
            (Some(pmcid), None)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeSource;
    use super::*;

    fn fetched(outcome: FetchOutcome) -> PaperRecord {
        match outcome {
            FetchOutcome::Fetched(r) => r,
            FetchOutcome::Skipped(s) => panic!("expected record, got skip: {s:?}"),
        }
    }

    #[tokio::test]
    async fn prefers_full_text_when_linked() {
        let source = FakeSource::default()
            .paper("1", "Title", "Abstract text.")
            .with_full_text("1", "PMC10", "Full body text.");

        let record = fetched(fetch_record(&source, "1").await);
        assert_eq!(record.source, TextSource::FullText);
        assert_eq!(record.body, "Full body text.");
        assert_eq!(record.abstract_text, "Abstract text.");
        assert_eq!(record.pmcid.as_deref(), Some("PMC10"));
        assert_eq!(record.link, "https://pubmed.ncbi.nlm.nih.gov/1/");
    }

    #[tokio::test]
    async fn falls_back_to_abstract_without_link() {
        let source = FakeSource::default().paper("2", "Title", "Only the abstract.");

        let record = fetched(fetch_record(&source, "2").await);
        assert_eq!(record.source, TextSource::AbstractOnly);
        assert_eq!(record.body, "Only the abstract.");
        assert!(record.pmcid.is_none());
    }

    #[tokio::test]
    async fn falls_back_to_abstract_when_full_text_fails() {
        let mut source = FakeSource::default()
            .paper("3", "Title", "Abstract.")
            .with_full_text("3", "PMC30", "unused");
        source.failing_full_texts.push("PMC30".into());

        let record = fetched(fetch_record(&source, "3").await);
        assert_eq!(record.source, TextSource::AbstractOnly);
        assert_eq!(record.body, "Abstract.");
    }

    #[tokio::test]
    async fn falls_back_to_abstract_when_full_text_has_no_body() {
        let source = FakeSource::default()
            .paper("4", "Title", "Abstract.")
            .with_full_text("4", "PMC40", "   ");

        let record = fetched(fetch_record(&source, "4").await);
        assert_eq!(record.source, TextSource::AbstractOnly);
    }

    #[tokio::test]
    async fn empty_when_no_text_at_all() {
        let source = FakeSource::default().paper("5", "Title", "");

        let record = fetched(fetch_record(&source, "5").await);
        assert_eq!(record.source, TextSource::Empty);
        assert!(record.body.is_empty());
    }

    #[tokio::test]
    async fn missing_summary_skips_without_text_fetch() {
        let source = FakeSource::default();

        match fetch_record(&source, "404").await {
            FetchOutcome::Skipped(s) => {
                assert_eq!(s.pmid, "404");
                assert!(s.reason.contains("not present"), "got: {}", s.reason);
            }
            FetchOutcome::Fetched(r) => panic!("expected skip, got {r:?}"),
        }
        assert_eq!(source.calls(), vec!["summary:404"]);
    }

    #[tokio::test]
    async fn summary_failure_skips_with_cause() {
        let mut source = FakeSource::default().paper("6", "Title", "Abstract.");
        source.failing_summaries.push("6".into());

        match fetch_record(&source, "6").await {
            FetchOutcome::Skipped(s) => assert!(s.reason.contains("backend unavailable")),
            FetchOutcome::Fetched(r) => panic!("expected skip, got {r:?}"),
        }
    }

    #[tokio::test]
    async fn summary_error_entry_skips() {
        let mut source = FakeSource::default();
        source.summaries.insert(
            "7".into(),
            crate::eutils::types::DocSummary {
                title: None,
                error: Some("cannot get document summary".into()),
            },
        );

        assert!(matches!(
            fetch_record(&source, "7").await,
            FetchOutcome::Skipped(_)
        ));
    }

    #[test]
    fn missing_title_displays_unavailable() {
        let record = PaperRecord {
            pmid: "8".into(),
            title: None,
            link: pubmed_link("8"),
            body: String::new(),
            abstract_text: "Text".into(),
            source: TextSource::AbstractOnly,
            pmcid: None,
        };
        assert_eq!(record.display_title(), "unavailable");
        assert_eq!(record.classification_text(), " Text");
    }
}
