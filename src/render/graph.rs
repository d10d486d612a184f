use serde::Serialize;

use crate::classify::{Regulation, RegulationBucket};
use crate::pipeline::Report;

pub const UP_COLOR: &str = "#00cc66";
pub const DOWN_COLOR: &str = "#cc3300";
pub const MIXED_COLOR: &str = "#9999ff";
pub const NO_REGULATED_MESSAGE: &str = "No regulated bacteria found.";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Bacteria regulation network</title>
<script src="https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js"></script>
<style>
  #network { width: 100%; height: 600px; border: 1px solid #ddd; background: #ffffff; }
  div.vis-tooltip { white-space: pre-line !important; max-width: 480px; }
</style>
</head>
<body>
<div id="network"></div>
<script>
  const nodes = new vis.DataSet(__NODES__);
  const edges = new vis.DataSet([]);
  new vis.Network(document.getElementById("network"), { nodes, edges }, {
    nodes: { shape: "dot", size: 16, font: { color: "black" } },
    physics: { stabilization: true }
  });
</script>
</body>
</html>
"#;

/// Node color from aggregated membership: green up-only, red down-only, blue otherwise.
pub fn node_color(has_up: bool, has_down: bool) -> &'static str {
    match (has_up, has_down) {
        (true, false) => UP_COLOR,
        (false, true) => DOWN_COLOR,
        _ => MIXED_COLOR,
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub color: &'static str,
}

pub fn build_nodes(report: &Report) -> Vec<GraphNode> {
    report
        .buckets
        .iter()
        .map(|(entity, bucket)| GraphNode {
            id: entity.to_string(),
            label: capitalize(entity),
            title: tooltip(report, bucket),
            color: node_color(!bucket.up.is_empty(), !bucket.down.is_empty()),
        })
        .collect()
}

/// What graph mode produces for a finished run.
#[derive(Debug)]
pub enum GraphOutcome {
    /// The search returned nothing; only the found line is shown.
    NoPapers,
    /// Papers were processed but no entity carries a direction.
    NoRegulated,
    Html(String),
}

pub fn graph_output(report: &Report) -> Result<GraphOutcome, serde_json::Error> {
    if report.found == 0 {
        return Ok(GraphOutcome::NoPapers);
    }
    if report.buckets.is_empty() {
        return Ok(GraphOutcome::NoRegulated);
    }
    render_graph(report).map(GraphOutcome::Html)
}

/// Standalone HTML page; node data is embedded as JSON.
pub fn render_graph(report: &Report) -> Result<String, serde_json::Error> {
    let nodes = serde_json::to_string(&build_nodes(report))?;
    Ok(TEMPLATE.replace("__NODES__", &nodes.replace("</", "<\\/")))
}

fn tooltip(report: &Report, bucket: &RegulationBucket) -> String {
    let mut out = String::new();
    for (heading, direction) in [
        ("Upregulated", Regulation::Up),
        ("Downregulated", Regulation::Down),
    ] {
        out.push_str(heading);
        out.push_str(":\n");
        for &index in bucket.papers(direction) {
            if let Some(paper) = report.papers.get(index) {
                out.push_str("• ");
                out.push_str(paper.record.display_title());
                out.push('\n');
            }
        }
    }
    out.trim_end().to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RegulationBuckets;
    use crate::pipeline::AnnotatedPaper;
    use crate::record::{PaperRecord, TextSource, pubmed_link};

    fn paper(pmid: &str, title: &str) -> AnnotatedPaper {
        AnnotatedPaper {
            record: PaperRecord {
                pmid: pmid.into(),
                title: Some(title.into()),
                link: pubmed_link(pmid),
                body: String::new(),
                abstract_text: String::new(),
                source: TextSource::AbstractOnly,
                pmcid: None,
            },
            mentions: vec![],
            regulation: None,
        }
    }

    fn report() -> Report {
        let mut buckets = RegulationBuckets::default();
        buckets.record("lactobacillus", 0, Regulation::Up);
        buckets.record("prevotella", 1, Regulation::Down);
        buckets.record("blautia", 0, Regulation::Up);
        buckets.record("blautia", 1, Regulation::Down);
        Report {
            term: "t".into(),
            found: 2,
            papers: vec![paper("1", "Paper One"), paper("2", "Paper </script> Two")],
            skipped: vec![],
            buckets,
        }
    }

    #[test]
    fn color_is_pure_three_way() {
        assert_eq!(node_color(true, false), UP_COLOR);
        assert_eq!(node_color(false, true), DOWN_COLOR);
        assert_eq!(node_color(true, true), MIXED_COLOR);
        assert_eq!(node_color(false, false), MIXED_COLOR);
    }

    #[test]
    fn one_node_per_entity_with_direction_color() {
        let nodes = build_nodes(&report());
        let by_id = |id: &str| nodes.iter().find(|n| n.id == id).unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(by_id("lactobacillus").color, UP_COLOR);
        assert_eq!(by_id("prevotella").color, DOWN_COLOR);
        assert_eq!(by_id("blautia").color, MIXED_COLOR);
        assert_eq!(by_id("blautia").label, "Blautia");
    }

    #[test]
    fn tooltip_lists_titles_per_direction() {
        let nodes = build_nodes(&report());
        let blautia = nodes.iter().find(|n| n.id == "blautia").unwrap();
        assert_eq!(
            blautia.title,
            "Upregulated:\n• Paper One\nDownregulated:\n• Paper </script> Two"
        );
    }

    #[test]
    fn zero_found_renders_nothing() {
        let empty = Report {
            term: "t".into(),
            found: 0,
            papers: vec![],
            skipped: vec![],
            buckets: RegulationBuckets::default(),
        };
        assert!(matches!(graph_output(&empty), Ok(GraphOutcome::NoPapers)));
    }

    #[test]
    fn papers_without_direction_render_no_graph() {
        let unregulated = Report {
            term: "t".into(),
            found: 1,
            papers: vec![paper("1", "Paper One")],
            skipped: vec![],
            buckets: RegulationBuckets::default(),
        };
        assert!(matches!(
            graph_output(&unregulated),
            Ok(GraphOutcome::NoRegulated)
        ));
    }

    #[test]
    fn regulated_entities_render_html() {
        match graph_output(&report()) {
            Ok(GraphOutcome::Html(html)) => {
                assert!(html.contains("vis-network"));
                assert!(html.contains("\"id\":\"blautia\""));
            }
            other => panic!("expected html, got: {other:?}"),
        }
    }

    #[test]
    fn html_embeds_nodes_without_closing_script() {
        let html = render_graph(&report()).unwrap();
        assert!(html.contains("\"id\":\"lactobacillus\""));
        assert!(html.contains("Paper <\\/script> Two"));
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
