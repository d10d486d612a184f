//! Output rendering: Markdown list and HTML relationship graph.

pub mod graph;
pub mod list;

use clap::ValueEnum;

use crate::pipeline::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Collapsible per-paper excerpts (Markdown)
    List,
    /// Entity graph colored by regulation direction (HTML)
    Graph,
}

pub fn found_line(report: &Report) -> String {
    let noun = if report.found == 1 { "paper" } else { "papers" };
    format!("Found {} {noun}.", report.found)
}

pub fn summary_line(report: &Report) -> String {
    format!(
        "Processed {} papers, skipped {}.",
        report.processed(),
        report.skipped.len()
    )
}

/// Collapse line breaks so user text cannot escape a heading or list item.
pub(crate) fn single_line(s: &str) -> String {
    s.split(['\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape text placed inside raw HTML (`<summary>`, sentence bullets).
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RegulationBuckets;

    fn empty_report(found: usize) -> Report {
        Report {
            term: String::new(),
            found,
            papers: vec![],
            skipped: vec![],
            buckets: RegulationBuckets::default(),
        }
    }

    #[test]
    fn found_line_pluralizes() {
        assert_eq!(found_line(&empty_report(0)), "Found 0 papers.");
        assert_eq!(found_line(&empty_report(1)), "Found 1 paper.");
        assert_eq!(found_line(&empty_report(7)), "Found 7 papers.");
    }

    #[test]
    fn single_line_joins_broken_text() {
        assert_eq!(single_line("gut\r\nbrain\naxis"), "gut brain axis");
        assert_eq!(single_line("stress"), "stress");
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape_html(r#"<i>E. coli</i> & "friends""#),
            "&lt;i&gt;E. coli&lt;/i&gt; &amp; &quot;friends&quot;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
