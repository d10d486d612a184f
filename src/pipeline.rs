//! Search → fetch → match → classify, one identifier at a time.

use tracing::{debug, info};

use crate::classify::{Regulation, RegulationBuckets, classify};
use crate::eutils::{EutilsError, LiteratureSource, SearchRequest};
use crate::matcher::{EntityMatcher, EntityMention};
use crate::query::SearchQuery;
use crate::record::{FetchOutcome, PaperRecord, SkippedId, fetch_record};

pub struct PipelineRequest<'a> {
    pub query: &'a SearchQuery,
    pub max_results: u32,
    pub sort: Option<&'a str>,
}

#[derive(Debug)]
pub struct AnnotatedPaper {
    pub record: PaperRecord,
    pub mentions: Vec<EntityMention>,
    pub regulation: Option<Regulation>,
}

#[derive(Debug)]
pub struct Report {
    pub term: String,
    pub found: usize,
    pub papers: Vec<AnnotatedPaper>,
    pub skipped: Vec<SkippedId>,
    pub buckets: RegulationBuckets,
}

impl Report {
    pub fn processed(&self) -> usize {
        self.papers.len()
    }

    pub fn matched_papers(&self) -> impl Iterator<Item = &AnnotatedPaper> {
        self.papers.iter().filter(|p| !p.mentions.is_empty())
    }
}

/// Run the whole search. Only the search call itself can fail the run;
/// per-identifier problems end up in `Report::skipped`.
pub async fn run(
    source: &impl LiteratureSource,
    matcher: &dyn EntityMatcher,
    req: &PipelineRequest<'_>,
) -> Result<Report, EutilsError> {
    let term = req.query.to_term();
    info!(term = %term, max_results = req.max_results, "searching");

    let ids = source
        .search(&SearchRequest {
            term: &term,
            max_results: req.max_results,
            sort: req.sort,
        })
        .await?;
    info!(found = ids.len(), "search complete");

    let mut report = Report {
        term,
        found: ids.len(),
        papers: Vec::new(),
        skipped: Vec::new(),
        buckets: RegulationBuckets::default(),
    };

    for pmid in &ids {
        match fetch_record(source, pmid).await {
            FetchOutcome::Fetched(record) => annotate(&mut report, matcher, record),
            FetchOutcome::Skipped(skipped) => report.skipped.push(skipped),
        }
    }

    info!(
        processed = report.processed(),
        skipped = report.skipped.len(),
        entities = report.buckets.len(),
        "pipeline complete"
    );
    Ok(report)
}

fn annotate(report: &mut Report, matcher: &dyn EntityMatcher, record: PaperRecord) {
    let mentions = if record.body.trim().is_empty() {
        Vec::new()
    } else {
        matcher.scan(&record.body)
    };

    let regulation = if mentions.is_empty() {
        None
    } else {
        classify(&record.classification_text())
    };

    let index = report.papers.len();
    if let Some(direction) = regulation {
        for mention in &mentions {
            report.buckets.record(&mention.entity, index, direction);
        }
    }

    debug!(
        pmid = %record.pmid,
        mentions = mentions.len(),
        regulation = regulation.map(Regulation::label),
        "paper annotated"
    );

    report.papers.push(AnnotatedPaper {
        record,
        mentions,
        regulation,
    });
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::matcher::DictionaryMatcher;
    use crate::record::testing::FakeSource;

    fn query() -> SearchQuery {
        SearchQuery::new(
            "stress",
            "women",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
    }

    async fn run_with(source: &FakeSource) -> Report {
        let q = query();
        let req = PipelineRequest {
            query: &q,
            max_results: 100,
            sort: None,
        };
        run(source, &DictionaryMatcher::new(), &req).await.unwrap()
    }

    #[tokio::test]
    async fn zero_results_fetch_nothing() {
        let source = FakeSource::default();
        let report = run_with(&source).await;

        assert_eq!(report.found, 0);
        assert!(report.papers.is_empty());
        assert!(report.skipped.is_empty());
        assert!(report.buckets.is_empty());
        assert_eq!(source.calls(), vec!["search:100"]);
    }

    #[tokio::test]
    async fn search_failure_is_fatal() {
        let source = FakeSource {
            search_error: true,
            ..FakeSource::default()
        };
        let q = query();
        let req = PipelineRequest {
            query: &q,
            max_results: 100,
            sort: None,
        };
        let err = run(&source, &DictionaryMatcher::new(), &req)
            .await
            .unwrap_err();
        assert!(matches!(err, EutilsError::Api { code: 500, .. }));
    }

    #[tokio::test]
    async fn single_up_paper_lands_in_up_bucket_only() {
        let source = FakeSource::default().paper(
            "1",
            "Gut flora under stress",
            "Lactobacillus levels were increased significantly",
        );
        let report = run_with(&source).await;

        let bucket = report.buckets.get("lactobacillus").unwrap();
        assert_eq!(bucket.up, vec![0]);
        assert!(bucket.down.is_empty());
    }

    #[tokio::test]
    async fn up_term_wins_for_every_entity_in_paper() {
        let source = FakeSource::default().paper(
            "1",
            "Mixed",
            "Bacteroides was reduced and Lactobacillus was elevated",
        );
        let report = run_with(&source).await;

        for entity in ["bacteroides", "lactobacillus"] {
            let bucket = report.buckets.get(entity).unwrap();
            assert_eq!(bucket.up, vec![0], "{entity}");
            assert!(bucket.down.is_empty(), "{entity}");
        }
    }

    #[tokio::test]
    async fn classification_reads_abstract_not_full_text() {
        let source = FakeSource::default()
            .paper("1", "Title", "Prevotella was lowered.")
            .with_full_text("1", "PMC1", "Prevotella was increased in the full text.");
        let report = run_with(&source).await;

        assert_eq!(report.papers[0].record.body, "Prevotella was increased in the full text.");
        let bucket = report.buckets.get("prevotella").unwrap();
        assert_eq!(bucket.down, vec![0]);
        assert!(bucket.up.is_empty());
    }

    #[tokio::test]
    async fn unclassified_paper_contributes_no_bucket() {
        let source =
            FakeSource::default().paper("1", "Title", "Blautia composition shifted.");
        let report = run_with(&source).await;

        assert_eq!(report.matched_papers().count(), 1);
        assert!(report.buckets.is_empty());
    }

    #[tokio::test]
    async fn skipped_ids_never_reach_matching() {
        let mut source = FakeSource::default()
            .paper("1", "Title", "Akkermansia was raised.")
            .paper("2", "Title", "Akkermansia was raised.");
        source.summaries.remove("2");

        let report = run_with(&source).await;

        assert_eq!(report.processed(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].pmid, "2");
        assert!(report.papers.iter().all(|p| p.record.pmid != "2"));
        assert_eq!(report.buckets.get("akkermansia").unwrap().up, vec![0]);
    }

    #[tokio::test]
    async fn per_record_failure_does_not_abort_batch() {
        let mut source = FakeSource::default()
            .paper("1", "A", "Rothia was decreased.")
            .paper("2", "B", "Rothia was decreased.")
            .paper("3", "C", "Rothia was decreased.");
        source.failing_summaries.push("2".into());

        let report = run_with(&source).await;

        assert_eq!(report.processed(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.buckets.get("rothia").unwrap().down, vec![0, 1]);
    }

    #[tokio::test]
    async fn empty_text_produces_no_entities() {
        let source = FakeSource::default().paper("1", "Lactobacillus increased", "");
        let report = run_with(&source).await;

        assert_eq!(report.processed(), 1);
        assert!(report.papers[0].mentions.is_empty());
        assert_eq!(report.matched_papers().count(), 0);
        assert!(report.buckets.is_empty());
    }

    #[tokio::test]
    async fn respects_result_cap() {
        let source = FakeSource::default()
            .paper("1", "A", "x")
            .paper("2", "B", "y")
            .paper("3", "C", "z");
        let q = query();
        let req = PipelineRequest {
            query: &q,
            max_results: 2,
            sort: Some("relevance"),
        };
        let report = run(&source, &DictionaryMatcher::new(), &req).await.unwrap();
        assert_eq!(report.found, 2);
    }
}
